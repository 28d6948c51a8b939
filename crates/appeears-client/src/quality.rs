//! Acceptable QA codes for a quality layer.

use tracing::{debug, warn};

use crate::api::AppeearsApi;
use crate::payload::QualityEntry;

/// QA codes whose observations may enter a monthly median.
///
/// An empty set means the legend was unavailable and nothing is filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptableCodes {
    codes: Vec<f64>,
}

impl AcceptableCodes {
    pub fn from_entries(entries: &[QualityEntry]) -> Self {
        let mut codes: Vec<f64> = Vec::new();
        for value in entries
            .iter()
            .filter(|e| e.acceptable)
            .filter_map(|e| e.value)
        {
            if !codes.contains(&value) {
                codes.push(value);
            }
        }
        Self { codes }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Whether a raw QA cell passes.
    pub fn accepts(&self, raw: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return false;
        }
        trimmed
            .parse::<f64>()
            .map(|code| self.codes.contains(&code))
            .unwrap_or(false)
    }
}

/// Fetch the legend for a QA layer; any failure degrades to unrestricted.
pub async fn classify_quality(
    api: &dyn AppeearsApi,
    token: &str,
    product: &str,
    qa_layer: &str,
) -> AcceptableCodes {
    match api.quality_legend(token, product, qa_layer).await {
        Ok(entries) => {
            let codes = AcceptableCodes::from_entries(&entries);
            debug!(
                product = %product,
                qa_layer = %qa_layer,
                acceptable = codes.len(),
                "Resolved acceptable QA codes"
            );
            codes
        }
        Err(e) => {
            warn!(
                product = %product,
                qa_layer = %qa_layer,
                error = %e,
                "Quality legend unavailable, accepting every QA value"
            );
            AcceptableCodes::unrestricted()
        }
    }
}
