//! Prometheus metric recording.

use std::time::Duration;

use metrics::{counter, histogram};

/// Request outcome label: `ok`, `invalid_request`, another error code, or `unexpected`.
pub fn record_request(outcome: &'static str, elapsed: Duration) {
    counter!("explore_requests_total", "outcome" => outcome).increment(1);
    histogram!("explore_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_task(outcome: &'static str) {
    counter!("appeears_tasks_total", "outcome" => outcome).increment(1);
}

pub fn record_poll_attempts(attempts: u32) {
    histogram!("appeears_poll_attempts").record(attempts as f64);
}
