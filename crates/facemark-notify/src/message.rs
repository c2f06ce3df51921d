// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification message composition.
//!
//! Subject and plaintext body vary by verification status. The verified
//! message includes the similarity percentage when a comparison actually
//! ran; the failed message includes the failure reason, the score against
//! the configured threshold when available, and remediation tips.

use facemark_core::AttendanceStatus;

/// A composed notification: subject plus plaintext body.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Compose the status-appropriate notification.
pub fn compose(
    status: AttendanceStatus,
    similarity_score: Option<f64>,
    error_message: Option<&str>,
    threshold: f64,
) -> Notification {
    match status {
        AttendanceStatus::Verified => compose_verified(similarity_score),
        _ => compose_failed(similarity_score, error_message, threshold),
    }
}

fn compose_verified(similarity_score: Option<f64>) -> Notification {
    let mut lines = vec![
        "Hello,".to_string(),
        String::new(),
        "Your attendance has been successfully verified!".to_string(),
        String::new(),
    ];

    if let Some(score) = similarity_score {
        lines.push("Verification Details:".to_string());
        lines.push(format!("- Face Match Confidence: {score:.1}%"));
        lines.push(String::new());
    }

    lines.extend([
        "Please log in to your Facemark account to view complete details including:"
            .to_string(),
        "- Verification timestamp".to_string(),
        "- Attendance history".to_string(),
        "- Full verification report".to_string(),
        String::new(),
        "Thank you for using Facemark.".to_string(),
        String::new(),
        "---".to_string(),
        "The Facemark Team".to_string(),
        String::new(),
        "Note: This is an automated notification. Please do not reply.".to_string(),
    ]);

    Notification {
        subject: "Attendance Verified Successfully".to_string(),
        body: lines.join("\n"),
    }
}

fn compose_failed(
    similarity_score: Option<f64>,
    error_message: Option<&str>,
    threshold: f64,
) -> Notification {
    let mut lines = vec![
        "Hello,".to_string(),
        String::new(),
        "Your recent attendance verification attempt was unsuccessful.".to_string(),
        String::new(),
    ];

    if let Some(reason) = error_message {
        lines.push("Reason:".to_string());
        lines.push(format!("- {reason}"));
        lines.push(String::new());
    }

    if let Some(score) = similarity_score {
        lines.push(format!(
            "Face Match Score: {score:.1}% (Threshold: {threshold:.1}%)"
        ));
        lines.push(String::new());
    }

    lines.extend([
        "Please try again with the following tips:".to_string(),
        "- Ensure good lighting conditions".to_string(),
        "- Keep your face clearly visible and centered".to_string(),
        "- Make sure only your face is in the frame".to_string(),
        "- Avoid wearing sunglasses or face coverings".to_string(),
        "- Hold the camera steady".to_string(),
        String::new(),
        "Log in to your Facemark account to:".to_string(),
        "- View the detailed failure reason".to_string(),
        "- Retry attendance verification".to_string(),
        "- View your attendance history".to_string(),
        String::new(),
        "---".to_string(),
        "The Facemark Team".to_string(),
        String::new(),
        "If you continue experiencing issues, please contact support.".to_string(),
    ]);

    Notification {
        subject: "Attendance Verification Failed".to_string(),
        body: lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_with_score_includes_confidence_line() {
        let n = compose(AttendanceStatus::Verified, Some(96.34), None, 80.0);
        assert_eq!(n.subject, "Attendance Verified Successfully");
        assert!(n.body.contains("Face Match Confidence: 96.3%"));
    }

    #[test]
    fn verified_without_score_omits_details_section() {
        let n = compose(AttendanceStatus::Verified, None, None, 80.0);
        assert!(!n.body.contains("Verification Details"));
        assert!(n.body.contains("successfully verified"));
    }

    #[test]
    fn failed_includes_reason_threshold_and_tips() {
        let n = compose(
            AttendanceStatus::Failed,
            Some(62.5),
            Some("Face verification failed: Similarity below threshold."),
            80.0,
        );
        assert_eq!(n.subject, "Attendance Verification Failed");
        assert!(n.body.contains("- Face verification failed: Similarity below threshold."));
        assert!(n.body.contains("Face Match Score: 62.5% (Threshold: 80.0%)"));
        assert!(n.body.contains("Ensure good lighting conditions"));
    }

    #[test]
    fn failed_without_score_omits_score_line() {
        let n = compose(
            AttendanceStatus::Failed,
            None,
            Some("No face detected in image."),
            80.0,
        );
        assert!(!n.body.contains("Face Match Score"));
        assert!(n.body.contains("No face detected in image."));
    }
}
