//! Runs one monthly extraction end to end.

use chrono::Utc;
use tracing::{info, instrument};

use appeears_client::bundle::fetch_result_csv;
use appeears_client::task::{authenticate, build_task_request, submit_task, wait_for_task_done};
use appeears_client::{aggregate_monthly, build_metric_definitions, parse_csv};
use earthpulse_common::{ErrorBody, ExploreError, MonthlyResponse};

use crate::metrics;
use crate::request::MonthlyQuery;
use crate::state::AppState;

/// A failed run, with the task id once one was assigned.
#[derive(Debug)]
pub struct MonthlyFailure {
    pub error: ExploreError,
    pub task_id: Option<String>,
}

impl MonthlyFailure {
    fn before_task(error: ExploreError) -> Self {
        Self { error, task_id: None }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody::from_error(&self.error, self.task_id.as_deref())
    }
}

impl From<ExploreError> for MonthlyFailure {
    fn from(error: ExploreError) -> Self {
        Self::before_task(error)
    }
}

/// Authenticate, resolve layers, run the task and aggregate its CSV.
///
/// Credentials are checked before any remote call is made.
#[instrument(skip(state, query), fields(provider = %query.provider, months = query.range.len()))]
pub async fn run_monthly(
    state: &AppState,
    query: &MonthlyQuery,
) -> Result<MonthlyResponse, MonthlyFailure> {
    let api = state.api.as_ref();

    let token = authenticate(api, state.credentials.as_ref()).await?;
    let definitions =
        build_metric_definitions(api, &token, query.provider, &query.metrics, &state.providers)
            .await?;

    let request = build_task_request(
        query.provider,
        &query.range,
        query.lat,
        query.lon,
        &definitions,
        Utc::now(),
    );
    let task = submit_task(api, &token, &request).await?;

    let task_id = task.id.clone();
    let with_task = |error: ExploreError| MonthlyFailure {
        error,
        task_id: Some(task_id.clone()),
    };

    let task = match wait_for_task_done(api, &token, task, &state.poll).await {
        Ok(task) => {
            metrics::record_task("done");
            metrics::record_poll_attempts(task.attempts);
            task
        }
        Err(error) => {
            metrics::record_task(error.error_code().unwrap_or("unexpected"));
            return Err(with_task(error));
        }
    };

    let csv = fetch_result_csv(api, &token, &task.id)
        .await
        .map_err(with_task)?;
    let records = parse_csv(&csv);
    let series = aggregate_monthly(&records, &query.range, &definitions);

    info!(
        task_id = %task.id,
        rows = records.len(),
        points = series.len(),
        "Monthly series built"
    );

    Ok(MonthlyResponse::new(
        query.provider,
        query.metrics.clone(),
        task.id,
        series,
    ))
}
