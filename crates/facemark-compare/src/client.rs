// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the face comparison service.
//!
//! Provides [`FaceCompareClient`] which handles request construction,
//! authentication, and the split between coded client errors (terminal, the
//! adapter maps them to a verification failure) and retryable failures
//! (throttling, server errors, transport) which surface as `Err`.

use std::time::Duration;

use facemark_core::FacemarkError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorBody, CompareFacesRequest, CompareFacesResponse};

/// Path of the compare-faces endpoint, relative to the configured base URL.
const COMPARE_PATH: &str = "/v1/compare-faces";

/// Outcome of one compare-faces call that produced a definitive answer.
#[derive(Debug)]
pub enum CompareApiOutcome {
    /// The service ran the comparison; taxonomy mapping happens in the adapter.
    Completed(CompareFacesResponse),
    /// The service rejected the request with a coded, non-retryable error.
    Rejected(ApiErrorBody),
}

/// HTTP client for the face comparison service.
#[derive(Debug, Clone)]
pub struct FaceCompareClient {
    client: reqwest::Client,
    base_url: String,
}

impl FaceCompareClient {
    /// Creates a new comparison service client.
    pub fn new(base_url: String, api_key: Option<&str>) -> Result<Self, FacemarkError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| FacemarkError::Config(format!("invalid comparison api key: {e}")))?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FacemarkError::Comparison {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one compare-faces request.
    ///
    /// Returns `Err` for throttling (429), server errors, transport failures,
    /// and unparseable error bodies -- the retryable class. Every other
    /// response maps to a [`CompareApiOutcome`].
    pub async fn compare_faces(
        &self,
        request: &CompareFacesRequest,
    ) -> Result<CompareApiOutcome, FacemarkError> {
        let url = format!("{}{COMPARE_PATH}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| FacemarkError::Comparison {
                message: format!("compare-faces request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "compare-faces response received");

        if status.is_success() {
            let body: CompareFacesResponse =
                response.json().await.map_err(|e| FacemarkError::Comparison {
                    message: format!("malformed compare-faces response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            return Ok(CompareApiOutcome::Completed(body));
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(FacemarkError::Comparison {
                message: format!("comparison service returned {status}: {body}"),
                source: None,
            });
        }

        // Remaining 4xx: a coded rejection the adapter turns into a terminal
        // verification failure. An unparseable body is treated as
        // unclassified and raised for retry.
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => Ok(CompareApiOutcome::Rejected(err)),
            Err(_) => Err(FacemarkError::Comparison {
                message: format!("comparison service returned {status}: {body}"),
                source: None,
            }),
        }
    }
}
