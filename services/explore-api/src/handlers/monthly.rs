//! `/api/explore/monthly` handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use earthpulse_common::ErrorBody;

use crate::metrics;
use crate::pipeline::{run_monthly, MonthlyFailure};
use crate::request::MonthlyRequestBody;
use crate::state::AppState;

/// GET /api/explore/monthly - Route description
pub async fn monthly_info_handler() -> Response {
    no_store(StatusCode::OK, &json!({ "ok": true, "route": "appeears monthly adapter" }))
}

/// POST /api/explore/monthly - Run a monthly extraction
pub async fn monthly_handler(Extension(state): Extension<Arc<AppState>>, body: Bytes) -> Response {
    let started = Instant::now();

    let query = match MonthlyRequestBody::from_json(&body).and_then(|body| body.validate())
    {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "Rejected monthly request");
            metrics::record_request("invalid_request", started.elapsed());
            return error_response(&MonthlyFailure::from(e));
        }
    };

    info!(
        provider = %query.provider,
        lat = query.lat,
        lon = query.lon,
        start = %query.range.start(),
        end = %query.range.end(),
        metrics = ?query.metrics,
        "Monthly request"
    );

    match run_monthly(&state, &query).await {
        Ok(response) => {
            metrics::record_request("ok", started.elapsed());
            no_store(StatusCode::OK, &response)
        }
        Err(failure) => {
            let outcome = failure.error.error_code().unwrap_or("unexpected");
            metrics::record_request(outcome, started.elapsed());
            error_response(&failure)
        }
    }
}

fn error_response(failure: &MonthlyFailure) -> Response {
    let status = StatusCode::from_u16(failure.error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(
            status = status.as_u16(),
            code = failure.error.error_code().unwrap_or("unexpected"),
            task_id = failure.task_id.as_deref().unwrap_or(""),
            error = %failure.error,
            "Monthly request failed"
        );
    }

    let body: ErrorBody = failure.body();
    no_store(status, &body)
}

fn no_store<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}
