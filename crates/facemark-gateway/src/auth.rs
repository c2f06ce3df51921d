// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity middleware for the gateway.
//!
//! Caller identity is established by an external identity provider; the
//! gateway only verifies that the claims document it receives was issued by
//! that provider. Requests carry an `X-Identity` JSON claims header and an
//! `X-Identity-Signature` header holding the hex HMAC-SHA256 of the exact
//! claims bytes under the shared `identity_secret`.
//!
//! When no secret is configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Identity verification configuration for the gateway.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Shared secret for claims verification. If `None`, every request is
    /// rejected.
    pub identity_secret: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field(
                "identity_secret",
                &self.identity_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Verified identity claims, inserted into request extensions for handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the caller's user id.
    pub sub: String,
    /// Optional email claim.
    #[serde(default)]
    pub email: Option<String>,
}

/// Middleware that validates the signed identity claims header.
///
/// On success the parsed [`IdentityClaims`] are inserted into request
/// extensions. Missing headers, bad signatures, and malformed claims all
/// yield 401 without detail.
pub async fn identity_middleware(
    State(auth): State<IdentityConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref secret) = auth.identity_secret else {
        tracing::error!("gateway has no identity secret configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims_bytes = request
        .headers()
        .get("x-identity")
        .map(|v| v.as_bytes().to_vec())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let signature_hex = request
        .headers()
        .get("x-identity-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let signature = hex::decode(signature_hex).map_err(|_| StatusCode::UNAUTHORIZED)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    mac.update(&claims_bytes);
    if mac.verify_slice(&signature).is_err() {
        tracing::debug!("identity signature verification failed");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let claims: IdentityClaims =
        serde_json::from_slice(&claims_bytes).map_err(|_| StatusCode::UNAUTHORIZED)?;
    if claims.sub.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Signs a claims document with the shared secret. Used by clients and tests.
pub fn sign_claims(secret: &str, claims_json: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(claims_json.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_config_debug_redacts_secret() {
        let config = IdentityConfig {
            identity_secret: Some("super-secret".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super-secret"));
        assert!(debug_output.contains("[redacted]"));
    }

    #[test]
    fn sign_claims_round_trips_through_verification() {
        let secret = "shared-secret";
        let claims = r#"{"sub":"u-1"}"#;
        let signature = sign_claims(secret, claims);

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(claims.as_bytes());
        assert!(mac.verify_slice(&hex::decode(signature).unwrap()).is_ok());
    }

    #[test]
    fn signature_depends_on_claims_bytes() {
        let secret = "shared-secret";
        assert_ne!(
            sign_claims(secret, r#"{"sub":"u-1"}"#),
            sign_claims(secret, r#"{"sub":"u-2"}"#),
        );
    }

    #[test]
    fn claims_parse_with_and_without_email() {
        let claims: IdentityClaims = serde_json::from_str(r#"{"sub":"u-1"}"#).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert!(claims.email.is_none());

        let claims: IdentityClaims =
            serde_json::from_str(r#"{"sub":"u-1","email":"a@b.edu"}"#).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.edu"));
    }
}
