// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end worker tests against temp-SQLite storage and mock services.

use std::sync::Arc;

use facemark_config::model::WorkerConfig;
use facemark_core::{
    AttendanceStatus, AttendanceStore, ComparisonErrorCode, ComparisonResult, FacemarkError,
    JobQueue,
};
use facemark_test_utils::TestHarness;
use facemark_worker::{JobProcessor, WorkerLoop};

const QUEUE: &str = "face-comparison";
const THRESHOLD: f64 = 80.0;

fn processor_for(harness: &TestHarness) -> Arc<JobProcessor> {
    Arc::new(JobProcessor::new(
        harness.storage.clone(),
        harness.storage.clone(),
        harness.comparator.clone(),
        harness.publisher.clone(),
        THRESHOLD,
    ))
}

fn worker_for(harness: &TestHarness) -> WorkerLoop {
    WorkerLoop::new(
        harness.storage.clone(),
        processor_for(harness),
        WorkerConfig {
            queue_name: QUEUE.to_string(),
            batch_size: 5,
            poll_interval_secs: 1,
            max_attempts: 3,
        },
    )
}

#[tokio::test]
async fn verified_submission_reaches_terminal_state_and_notifies() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    harness
        .comparator
        .script_result(Ok(ComparisonResult::verified(96.3)))
        .await;

    let worker = worker_for(&harness);
    assert_eq!(worker.poll_once().await.unwrap(), 1);

    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Verified);
    assert_eq!(record.similarity_score, Some(96.3));
    assert!(record.verified_at.is_some());

    // Comparison ran against the registered reference image.
    let calls = harness.comparator.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].reference_key, "faces/registered/u-1/ref.jpg");
    assert_eq!(calls[0].candidate_key, job.face_s3_key);
    assert_eq!(calls[0].threshold, THRESHOLD);

    // Exactly one notification.
    let published = harness.publisher.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].status, AttendanceStatus::Verified);
    assert_eq!(published[0].similarity_score, Some(96.3));
}

#[tokio::test]
async fn below_threshold_outcome_is_a_terminal_failure_not_a_retry() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    harness
        .comparator
        .script_result(Ok(ComparisonResult::failure(
            ComparisonErrorCode::SimilarityBelowThreshold,
            "Face verification failed: Similarity below threshold.",
            None,
        )))
        .await;

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Failed);
    assert!(
        record
            .error_message
            .as_deref()
            .unwrap()
            .contains("below threshold")
    );

    // The entry was acknowledged, not redelivered.
    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());

    let published = harness.publisher.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].status, AttendanceStatus::Failed);
}

#[tokio::test]
async fn redelivered_job_is_skipped_by_the_idempotency_guard() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    harness
        .comparator
        .script_result(Ok(ComparisonResult::verified(91.0)))
        .await;

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    // Simulate at-least-once delivery: the same job lands in the queue again.
    let payload = serde_json::to_string(&job).unwrap();
    harness.storage.enqueue(QUEUE, &payload).await.unwrap();
    worker.poll_once().await.unwrap();

    // No re-comparison, no duplicate notification, record untouched.
    assert_eq!(harness.comparator.call_count().await, 1);
    assert_eq!(harness.publisher.publish_count().await, 1);

    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Verified);
    assert_eq!(record.similarity_score, Some(91.0));
}

#[tokio::test]
async fn malformed_job_is_dropped_without_redelivery() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .storage
        .enqueue(QUEUE, r#"{"tracking_id": "t-1", "user_id": "u-1"}"#)
        .await
        .unwrap();

    let worker = worker_for(&harness);
    assert_eq!(worker.poll_once().await.unwrap(), 1);

    // Dropped, acknowledged, never retried.
    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());
    assert_eq!(harness.comparator.call_count().await, 0);
    assert_eq!(harness.publisher.publish_count().await, 0);
}

#[tokio::test]
async fn empty_required_fields_are_dropped_without_redelivery() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .storage
        .enqueue(
            QUEUE,
            r#"{"tracking_id": "", "user_id": "u-1",
                "face_s3_key": "k.jpg", "attendance_date": "2026-03-02T09:15:00Z"}"#,
        )
        .await
        .unwrap();

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();
    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());
    assert_eq!(harness.comparator.call_count().await, 0);
}

#[tokio::test]
async fn missing_student_profile_is_dropped_without_redelivery() {
    let harness = TestHarness::new().await.unwrap();
    // Record + job exist but no student profile was ever created.
    harness.seed_submission("ghost", QUEUE).await.unwrap();

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());
    assert_eq!(harness.comparator.call_count().await, 0);
}

#[tokio::test]
async fn unregistered_face_is_dropped_without_redelivery() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", false).await.unwrap();
    harness.seed_submission("u-1", QUEUE).await.unwrap();

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());
    assert_eq!(harness.comparator.call_count().await, 0);
}

#[tokio::test]
async fn throttled_comparison_is_redelivered_and_leaves_record_untouched() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    harness
        .comparator
        .script_result(Err(FacemarkError::Comparison {
            message: "comparison service returned 429".to_string(),
            source: None,
        }))
        .await;

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    // Record is untouched.
    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Processing);
    assert!(record.similarity_score.is_none());
    assert_eq!(harness.publisher.publish_count().await, 0);

    // The entry is redelivered; the next cycle (script exhausted, mock
    // verifies by default) completes it.
    worker.poll_once().await.unwrap();
    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Verified);
    assert_eq!(harness.comparator.call_count().await, 2);
}

#[tokio::test]
async fn persistently_failing_job_dead_letters_at_max_attempts() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    for _ in 0..3 {
        harness
            .comparator
            .script_result(Err(FacemarkError::Comparison {
                message: "service unavailable".to_string(),
                source: None,
            }))
            .await;
    }

    let worker = worker_for(&harness);
    for _ in 0..3 {
        worker.poll_once().await.unwrap();
    }

    // Dead-lettered: no further delivery, record still processing.
    assert_eq!(worker.poll_once().await.unwrap(), 0);
    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Processing);
}

#[tokio::test]
async fn publish_failure_does_not_fail_the_job() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    let job = harness.seed_submission("u-1", QUEUE).await.unwrap();

    harness.publisher.fail_publishes(true);
    harness
        .comparator
        .script_result(Ok(ComparisonResult::verified(88.8)))
        .await;

    let worker = worker_for(&harness);
    worker.poll_once().await.unwrap();

    // The result is durably persisted and the entry acknowledged even though
    // notification failed.
    let record = harness
        .storage
        .get_record_by_tracking_id(&job.tracking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Verified);
    assert!(harness.storage.dequeue(QUEUE).await.unwrap().is_none());
}

#[tokio::test]
async fn batch_reports_only_retryable_failures() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_student("u-1", true).await.unwrap();
    harness.seed_student("u-2", true).await.unwrap();

    harness.seed_submission("u-1", QUEUE).await.unwrap();
    harness.seed_submission("u-2", QUEUE).await.unwrap();
    harness.storage.enqueue(QUEUE, "not json").await.unwrap();

    // u-1 verifies, u-2 hits a retryable failure, third entry is malformed.
    harness
        .comparator
        .script_result(Ok(ComparisonResult::verified(95.0)))
        .await;
    harness
        .comparator
        .script_result(Err(FacemarkError::Comparison {
            message: "throttled".to_string(),
            source: None,
        }))
        .await;

    let mut entries = Vec::new();
    while let Some(entry) = harness.storage.dequeue(QUEUE).await.unwrap() {
        entries.push(entry);
    }
    assert_eq!(entries.len(), 3);

    let processor = processor_for(&harness);
    let outcome = processor.process_batch(&entries).await;

    assert_eq!(outcome.failures, vec![entries[1].id]);
    assert_eq!(outcome.handled, 2);
}
