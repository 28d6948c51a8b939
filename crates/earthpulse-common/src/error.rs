//! Error types for the explore pipeline.

use thiserror::Error;

use crate::ids::Metric;

/// Result type alias using ExploreError.
pub type ExploreResult<T> = Result<T, ExploreError>;

/// Primary error type for monthly extraction requests.
#[derive(Debug, Error)]
pub enum ExploreError {
    // === Caller Errors ===
    #[error("{0}")]
    Validation(String),

    // === Operator Errors ===
    #[error("AppEEARS credentials are not configured.")]
    MissingCredentials,

    // === Remote Errors ===
    #[error("AppEEARS login failed: {0}")]
    Authentication(String),

    #[error("Could not resolve data layer for {product} ({metric}).")]
    LayerResolution { product: String, metric: Metric },

    #[error("Could not resolve QA layer for {product} ({metric}).")]
    QaLayerResolution { product: String, metric: Metric },

    #[error("Failed to create AppEEARS task: {0}")]
    TaskSubmission(String),

    #[error("AppEEARS task {task_id} failed.")]
    TaskFailed { task_id: String },

    #[error("AppEEARS task {task_id} timed out after {attempts} status checks.")]
    TaskTimeout { task_id: String, attempts: u32 },

    #[error("AppEEARS task completed but no CSV file found.")]
    NoOutputFile { task_id: String },

    #[error("AppEEARS request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("AppEEARS request failed: {0}")]
    RemoteTransport(String),

    // === Infrastructure Errors ===
    #[error("Unexpected server error: {0}")]
    Unexpected(String),
}

impl ExploreError {
    /// Shorthand for a caller-fixable input error.
    pub fn validation(message: impl Into<String>) -> Self {
        ExploreError::Validation(message.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ExploreError::Validation(_) => 400,

            ExploreError::MissingCredentials => 501,

            ExploreError::Authentication(_)
            | ExploreError::LayerResolution { .. }
            | ExploreError::QaLayerResolution { .. }
            | ExploreError::TaskSubmission(_)
            | ExploreError::TaskFailed { .. }
            | ExploreError::TaskTimeout { .. }
            | ExploreError::NoOutputFile { .. }
            | ExploreError::Remote { .. }
            | ExploreError::RemoteTransport(_) => 502,

            ExploreError::Unexpected(_) => 500,
        }
    }

    /// Machine-readable code reported alongside the message.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ExploreError::Validation(_) => Some("invalid_request"),
            ExploreError::MissingCredentials => Some("missing_credentials"),
            ExploreError::Authentication(_) => Some("login_failed"),
            ExploreError::LayerResolution { .. } => Some("layer_unresolved"),
            ExploreError::QaLayerResolution { .. } => Some("qa_layer_unresolved"),
            ExploreError::TaskSubmission(_) => Some("task_submission_failed"),
            ExploreError::TaskFailed { .. } => Some("task_failed"),
            ExploreError::TaskTimeout { .. } => Some("task_timeout"),
            ExploreError::NoOutputFile { .. } => Some("no_output_file"),
            ExploreError::Remote { .. } | ExploreError::RemoteTransport(_) => {
                Some("remote_request_failed")
            }
            ExploreError::Unexpected(_) => None,
        }
    }

    /// Task id carried by task-scoped failures.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            ExploreError::TaskFailed { task_id }
            | ExploreError::TaskTimeout { task_id, .. }
            | ExploreError::NoOutputFile { task_id } => Some(task_id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExploreError {
    fn from(err: serde_json::Error) -> Self {
        ExploreError::Unexpected(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ExploreError::validation("bad").http_status_code(), 400);
        assert_eq!(ExploreError::MissingCredentials.http_status_code(), 501);
        assert_eq!(
            ExploreError::TaskFailed { task_id: "t1".into() }.http_status_code(),
            502
        );
        assert_eq!(
            ExploreError::Remote { status: 404, message: "gone".into() }.http_status_code(),
            502
        );
        assert_eq!(ExploreError::Unexpected("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn test_missing_credentials_code() {
        assert_eq!(
            ExploreError::MissingCredentials.error_code(),
            Some("missing_credentials")
        );
        assert_eq!(ExploreError::Unexpected("x".into()).error_code(), None);
    }

    #[test]
    fn test_task_id_only_on_task_errors() {
        let err = ExploreError::TaskTimeout { task_id: "abc".into(), attempts: 45 };
        assert_eq!(err.task_id(), Some("abc"));
        assert!(err.to_string().contains("timed out after 45"));

        assert_eq!(ExploreError::TaskSubmission("no id".into()).task_id(), None);
    }

    #[test]
    fn test_layer_error_display() {
        let err = ExploreError::LayerResolution {
            product: "MOD13Q1.061".into(),
            metric: Metric::Ndvi,
        };
        assert_eq!(
            err.to_string(),
            "Could not resolve data layer for MOD13Q1.061 (ndvi)."
        );
    }
}
