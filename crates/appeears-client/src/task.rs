//! Point-extraction task lifecycle: authenticate, submit, poll.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use earthpulse_common::{ExploreError, ExploreResult, MonthRange, Provider};

use crate::api::{AppeearsApi, Credentials};
use crate::metric::MetricDefinition;
use crate::payload::{DateWindow, LayerRef, TaskCoordinate, TaskParams, TaskRequest};

/// Id given to the single extraction point of a task.
pub const POINT_ID: &str = "explore-point-1";

/// Status polling cadence.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between status checks
    pub interval: Duration,
    /// Status checks before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(6),
            max_attempts: 45,
        }
    }
}

/// Lifecycle state of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Done,
    Error,
    Failed,
    TimedOut,
}

impl TaskState {
    /// Map a lowercased remote status; unknown values keep polling.
    pub fn from_remote(status: &str) -> Self {
        match status {
            "done" => TaskState::Done,
            "error" => TaskState::Error,
            "failed" => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Done => "done",
            TaskState::Error => "error",
            TaskState::Failed => "failed",
            TaskState::TimedOut => "timed-out",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted task and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    /// Status checks performed so far
    pub attempts: u32,
}

/// Exchange configured credentials for a bearer token.
pub async fn authenticate(
    api: &dyn AppeearsApi,
    credentials: Option<&Credentials>,
) -> ExploreResult<String> {
    let credentials = credentials.ok_or(ExploreError::MissingCredentials)?;
    let token = api.login(credentials).await?;
    debug!("Authenticated with AppEEARS");
    Ok(token)
}

/// Drop repeated (product, layer) pairs, keeping first-seen order.
pub fn dedupe_layers(layers: impl IntoIterator<Item = LayerRef>) -> Vec<LayerRef> {
    let mut seen = HashSet::new();
    layers
        .into_iter()
        .filter(|layer| seen.insert(layer.clone()))
        .collect()
}

/// Build the point task covering every requested metric.
pub fn build_task_request(
    provider: Provider,
    range: &MonthRange,
    latitude: f64,
    longitude: f64,
    definitions: &[MetricDefinition],
    submitted_at: DateTime<Utc>,
) -> TaskRequest {
    let layers = dedupe_layers(definitions.iter().flat_map(MetricDefinition::layer_refs));

    TaskRequest {
        task_type: "point".to_string(),
        task_name: format!(
            "earthpulse-{}-{}",
            provider,
            submitted_at.timestamp_millis()
        ),
        params: TaskParams {
            dates: vec![DateWindow {
                start_date: range.start().first_day_mdy(),
                end_date: range.end().last_day_mdy(),
            }],
            layers,
            coordinates: vec![TaskCoordinate {
                id: POINT_ID.to_string(),
                latitude,
                longitude,
            }],
        },
    }
}

/// Submit a task and return it in the pending state.
#[instrument(skip(api, token, request), fields(task_name = %request.task_name, layers = request.params.layers.len()))]
pub async fn submit_task(
    api: &dyn AppeearsApi,
    token: &str,
    request: &TaskRequest,
) -> ExploreResult<Task> {
    let submission = api.submit_task(token, request).await?;
    let id = submission.task_id.ok_or_else(|| {
        ExploreError::TaskSubmission("no task_id in AppEEARS response".to_string())
    })?;

    info!(task_id = %id, "Submitted AppEEARS task");
    Ok(Task {
        id,
        state: TaskState::Pending,
        attempts: 0,
    })
}

/// Poll until the task is done, fails, or the attempt ceiling is reached.
///
/// Dropping the returned future stops polling; the remote task keeps running.
#[instrument(skip(api, token, task, poll), fields(task_id = %task.id))]
pub async fn wait_for_task_done(
    api: &dyn AppeearsApi,
    token: &str,
    mut task: Task,
    poll: &PollConfig,
) -> ExploreResult<Task> {
    for attempt in 1..=poll.max_attempts {
        let status = api.task_status(token, &task.id).await?.status();
        task.attempts = attempt;
        task.state = TaskState::from_remote(&status);

        match task.state {
            TaskState::Done => {
                info!(attempts = attempt, "AppEEARS task done");
                return Ok(task);
            }
            TaskState::Error | TaskState::Failed => {
                warn!(attempts = attempt, status = %status, "AppEEARS task failed");
                return Err(ExploreError::TaskFailed { task_id: task.id });
            }
            TaskState::Pending | TaskState::TimedOut => {
                debug!(attempt = attempt, status = %status, "AppEEARS task not ready");
            }
        }

        if attempt < poll.max_attempts {
            tokio::time::sleep(poll.interval).await;
        }
    }

    warn!(attempts = poll.max_attempts, state = %TaskState::TimedOut, "AppEEARS task timed out");
    Err(ExploreError::TaskTimeout {
        task_id: task.id,
        attempts: poll.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::AcceptableCodes;
    use chrono::TimeZone;
    use earthpulse_common::{Metric, Month};

    fn definition(metric: Metric, product: &str, data: &str, qa: &str) -> MetricDefinition {
        MetricDefinition {
            metric,
            product: product.into(),
            data_layer: data.into(),
            qa_layer: qa.into(),
            acceptable_qa: AcceptableCodes::unrestricted(),
            scale: 1.0,
            offset: 0.0,
            fill_value: None,
        }
    }

    #[test]
    fn test_remote_state_mapping() {
        assert_eq!(TaskState::from_remote("done"), TaskState::Done);
        assert_eq!(TaskState::from_remote("error"), TaskState::Error);
        assert_eq!(TaskState::from_remote("failed"), TaskState::Failed);
        assert_eq!(TaskState::from_remote("processing"), TaskState::Pending);
        assert_eq!(TaskState::from_remote("queued"), TaskState::Pending);
        assert!(!TaskState::Pending.is_terminal());
        assert!(TaskState::TimedOut.is_terminal());
        assert_eq!(TaskState::TimedOut.to_string(), "timed-out");
    }

    #[test]
    fn test_dedupe_keeps_first_seen_order() {
        let layers = dedupe_layers(vec![
            LayerRef::new("A", "x"),
            LayerRef::new("A", "qa"),
            LayerRef::new("B", "y"),
            LayerRef::new("A", "qa"),
            LayerRef::new("B", "qa"),
        ]);
        assert_eq!(
            layers,
            vec![
                LayerRef::new("A", "x"),
                LayerRef::new("A", "qa"),
                LayerRef::new("B", "y"),
                LayerRef::new("B", "qa"),
            ]
        );
    }

    #[test]
    fn test_build_task_request() {
        let range = MonthRange::new(Month::parse("2020-01").unwrap(), Month::parse("2020-02").unwrap());
        let defs = vec![
            definition(Metric::Ndvi, "MOD13Q1.061", "_250m_16_days_NDVI", "_250m_16_days_VI_Quality"),
            definition(Metric::Lst, "MOD11A2.061", "LST_Day_1km", "QC_Day"),
        ];
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let request = build_task_request(Provider::Modis, &range, 36.97, -122.03, &defs, at);

        assert_eq!(request.task_type, "point");
        assert_eq!(request.task_name, format!("earthpulse-modis-{}", at.timestamp_millis()));
        assert_eq!(request.params.dates[0].start_date, "01-01-2020");
        assert_eq!(request.params.dates[0].end_date, "02-29-2020");
        assert_eq!(request.params.layers.len(), 4);
        assert_eq!(request.params.layers[1], LayerRef::new("MOD13Q1.061", "_250m_16_days_VI_Quality"));
        assert_eq!(request.params.coordinates[0].id, POINT_ID);
        assert_eq!(request.params.coordinates[0].latitude, 36.97);
        assert_eq!(request.params.coordinates[0].longitude, -122.03);
    }

    #[test]
    fn test_poll_defaults() {
        let poll = PollConfig::default();
        assert_eq!(poll.interval, Duration::from_secs(6));
        assert_eq!(poll.max_attempts, 45);
    }
}
