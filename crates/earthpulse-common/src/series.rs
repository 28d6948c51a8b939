//! Response shapes returned to callers of the monthly endpoint.

use serde::{Deserialize, Serialize};

use crate::error::ExploreError;
use crate::ids::{Metric, Provider};
use crate::month::Month;

/// One month of the output series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub month: Month,
    /// Largest accepted-observation count across metrics.
    pub count: usize,
    /// Mean acceptance ratio across observed metrics, `null` when nothing was observed.
    pub qa_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndvi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lst: Option<f64>,
}

impl SeriesPoint {
    pub fn empty(month: Month) -> Self {
        Self {
            month,
            count: 0,
            qa_score: None,
            ndvi: None,
            lst: None,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ndvi => self.ndvi,
            Metric::Lst => self.lst,
        }
    }

    pub fn set_value(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Ndvi => self.ndvi = Some(value),
            Metric::Lst => self.lst = Some(value),
        }
    }
}

/// Successful monthly extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResponse {
    pub source: String,
    pub provider: Provider,
    pub metrics: Vec<Metric>,
    pub task_id: String,
    pub series: Vec<SeriesPoint>,
}

impl MonthlyResponse {
    pub const SOURCE: &'static str = "appeears";

    pub fn new(
        provider: Provider,
        metrics: Vec<Metric>,
        task_id: String,
        series: Vec<SeriesPoint>,
    ) -> Self {
        Self {
            source: Self::SOURCE.to_string(),
            provider,
            metrics,
            task_id,
            series,
        }
    }
}

/// Failure body: `{error, code?, taskId?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl ErrorBody {
    /// Build the body for an error, preferring the error's own task id.
    pub fn from_error(error: &ExploreError, task_id: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().map(str::to_string),
            task_id: error.task_id().or(task_id).map(str::to_string),
        }
    }
}
