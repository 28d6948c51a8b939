//! Task lifecycle tests against the in-memory AppEEARS.

use std::time::Duration;

use serde_json::json;

use appeears_client::task::{authenticate, submit_task, wait_for_task_done};
use appeears_client::{Credentials, PollConfig, Task, TaskState};
use earthpulse_common::ExploreError;
use test_utils::FakeAppeears;

fn poll(max_attempts: u32) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_attempts,
    }
}

fn pending_task() -> Task {
    Task {
        id: "task-123".to_string(),
        state: TaskState::Pending,
        attempts: 0,
    }
}

#[tokio::test]
async fn test_done_after_pending_checks() {
    let fake = FakeAppeears::new().with_statuses(vec![
        json!({ "status": "queued" }),
        json!({ "status": "processing" }),
        json!({ "status": "Done" }),
    ]);

    let task = wait_for_task_done(&fake, "t", pending_task(), &poll(5))
        .await
        .unwrap();

    assert_eq!(task.state, TaskState::Done);
    assert_eq!(task.attempts, 3);
    assert_eq!(fake.calls_to("status:"), 3);
}

#[tokio::test]
async fn test_state_field_and_array_payloads() {
    let fake = FakeAppeears::new().with_statuses(vec![json!([{ "state": "done" }])]);
    let task = wait_for_task_done(&fake, "t", pending_task(), &poll(2))
        .await
        .unwrap();
    assert_eq!(task.attempts, 1);
}

#[tokio::test]
async fn test_failed_status_stops_polling() {
    let fake = FakeAppeears::new().with_statuses(vec![
        json!({ "status": "processing" }),
        json!({ "status": "failed" }),
        json!({ "status": "done" }),
    ]);

    let err = wait_for_task_done(&fake, "t", pending_task(), &poll(10))
        .await
        .unwrap_err();

    assert!(matches!(err, ExploreError::TaskFailed { ref task_id } if task_id == "task-123"));
    assert_eq!(fake.calls_to("status:"), 2);
}

#[tokio::test]
async fn test_timeout_after_exact_attempts() {
    let fake = FakeAppeears::new();

    let err = wait_for_task_done(&fake, "t", pending_task(), &poll(4))
        .await
        .unwrap_err();

    assert!(matches!(err, ExploreError::TaskTimeout { attempts: 4, .. }));
    assert_eq!(err.task_id(), Some("task-123"));
    assert_eq!(fake.calls_to("status:"), 4);
}

#[tokio::test]
async fn test_authenticate_requires_credentials() {
    let fake = FakeAppeears::new();
    let err = authenticate(&fake, None).await.unwrap_err();
    assert!(matches!(err, ExploreError::MissingCredentials));
    assert!(fake.call_log().is_empty());

    let creds = Credentials::from_parts(Some("user".into()), Some("pw".into()));
    assert_eq!(authenticate(&fake, creds.as_ref()).await.unwrap(), "fake-token");
}

#[tokio::test]
async fn test_submit_without_task_id() {
    let fake = FakeAppeears::new().without_task_id();
    let request = appeears_client::TaskRequest {
        task_type: "point".into(),
        task_name: "earthpulse-modis-0".into(),
        params: appeears_client::payload::TaskParams {
            dates: vec![],
            layers: vec![],
            coordinates: vec![],
        },
    };

    let err = submit_task(&fake, "t", &request).await.unwrap_err();
    assert!(matches!(err, ExploreError::TaskSubmission(_)));
}
