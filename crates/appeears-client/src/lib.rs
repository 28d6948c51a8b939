//! AppEEARS point-extraction client.
//!
//! Resolves product layers, runs a point task against the AppEEARS REST
//! API and turns the resulting CSV into a quality-filtered monthly series.
//!
//! # Pipeline
//!
//! 1. [`task::authenticate`] exchanges credentials for a token.
//! 2. [`metric::build_metric_definitions`] resolves data/QA layers and
//!    acceptable QA codes for every metric.
//! 3. [`task::submit_task`] and [`task::wait_for_task_done`] run the task.
//! 4. [`bundle::fetch_result_csv`] downloads the output table.
//! 5. [`tabular::parse_csv`] and [`aggregate::aggregate_monthly`] build the series.

pub mod aggregate;
pub mod api;
pub mod bundle;
pub mod layers;
pub mod metric;
pub mod payload;
pub mod provider;
pub mod quality;
pub mod tabular;
pub mod task;

pub use aggregate::aggregate_monthly;
pub use api::{AppeearsApi, ClientConfig, Credentials, HttpAppeearsClient, DEFAULT_BASE_URL};
pub use metric::{build_metric_definitions, MetricDefinition};
pub use payload::{Bundle, BundleFile, LayerCatalog, QualityEntry, StatusPayload, TaskRequest};
pub use provider::{ConfigError, ProviderTable};
pub use quality::AcceptableCodes;
pub use tabular::{parse_csv, Record};
pub use task::{PollConfig, Task, TaskState};
