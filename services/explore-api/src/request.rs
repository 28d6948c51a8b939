//! Monthly request body and its validation.

use serde::Deserialize;
use serde_json::Value;

use earthpulse_common::{ExploreError, ExploreResult, Metric, Month, MonthRange, Provider};

/// First month used when the caller gives none.
pub const DEFAULT_START_MONTH: &str = "2020-01";

/// Raw body of `POST /api/explore/monthly`.
///
/// Fields stay loosely typed so every problem can be reported as a
/// validation error naming the field, rather than a generic decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRequestBody {
    #[serde(default)]
    pub provider: Option<Value>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,
    #[serde(default)]
    pub start_month: Option<Value>,
    #[serde(default)]
    pub end_month: Option<Value>,
    #[serde(default)]
    pub metrics: Option<Value>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyQuery {
    pub provider: Provider,
    pub lat: f64,
    pub lon: f64,
    pub range: MonthRange,
    pub metrics: Vec<Metric>,
}

impl MonthlyRequestBody {
    /// Decode a raw body. Only a JSON object is accepted; serde would
    /// otherwise fill the fields positionally from an array.
    pub fn from_json(bytes: &[u8]) -> ExploreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ExploreError::validation(format!("Invalid JSON body: {}", e)))?;
        if !value.is_object() {
            return Err(ExploreError::validation(
                "Invalid JSON body: expected an object.",
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ExploreError::validation(format!("Invalid JSON body: {}", e)))
    }

    /// Validate coordinates, then months, then metrics, then provider.
    pub fn validate(&self) -> ExploreResult<MonthlyQuery> {
        let lat = coordinate(self.lat.as_ref(), "latitude", 90.0)?;
        let lon = coordinate(self.lon.as_ref(), "longitude", 180.0)?;

        let start = month_field(self.start_month.as_ref(), "startMonth")?
            .unwrap_or_else(default_start_month);
        let end = month_field(self.end_month.as_ref(), "endMonth")?.unwrap_or(start);
        let range = MonthRange::new(start, end);

        let metrics = requested_metrics(self.metrics.as_ref());
        if metrics.is_empty() {
            return Err(ExploreError::validation(
                "At least one metric is required (ndvi, lst).",
            ));
        }

        let provider = provider_field(self.provider.as_ref())?;

        Ok(MonthlyQuery {
            provider,
            lat,
            lon,
            range,
            metrics,
        })
    }
}

/// 2020-01
fn default_start_month() -> Month {
    Month::from_index(2020 * 12)
}

/// Treat `null` and `""` as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn coordinate(value: Option<&Value>, axis: &str, bound: f64) -> ExploreResult<f64> {
    let parsed = match present(value) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite() && (-bound..=bound).contains(v))
        .ok_or_else(|| {
            ExploreError::validation(format!(
                "Invalid {}: expected a number between -{} and {}.",
                axis, bound, bound
            ))
        })
}

fn month_field(value: Option<&Value>, field: &str) -> ExploreResult<Option<Month>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    value
        .as_str()
        .and_then(|s| Month::parse(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| {
            ExploreError::validation(format!(
                "{} must be YYYY-MM with a month between 01 and 12.",
                field
            ))
        })
}

/// Known metric ids in request order; unknown ids dropped, repeats collapsed.
fn requested_metrics(value: Option<&Value>) -> Vec<Metric> {
    let Some(Value::Array(items)) = value else {
        return Metric::ALL.to_vec();
    };

    let mut metrics = Vec::new();
    for metric in items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| s.parse::<Metric>().ok())
    {
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    metrics
}

fn provider_field(value: Option<&Value>) -> ExploreResult<Provider> {
    let Some(value) = present(value) else {
        return Ok(Provider::Modis);
    };

    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.parse::<Provider>().map_err(|_| {
        ExploreError::validation(format!(
            "Unknown provider '{}'; expected one of modis, viirs.",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> MonthlyRequestBody {
        serde_json::from_value(value).unwrap()
    }

    fn error_message(value: Value) -> String {
        body(value).validate().unwrap_err().to_string()
    }

    #[test]
    fn test_defaults() {
        let query = body(json!({ "lat": 36.97, "lon": -122.03 })).validate().unwrap();
        assert_eq!(query.provider, Provider::Modis);
        assert_eq!(query.range.start().to_string(), DEFAULT_START_MONTH);
        assert_eq!(query.range.end().to_string(), "2020-01");
        assert_eq!(query.metrics, vec![Metric::Ndvi, Metric::Lst]);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let query = body(json!({ "lat": " 10.5", "lon": "-20" })).validate().unwrap();
        assert_eq!(query.lat, 10.5);
        assert_eq!(query.lon, -20.0);
    }

    #[test]
    fn test_latitude_out_of_range() {
        let message = error_message(json!({ "lat": 95, "lon": 0 }));
        assert!(message.contains("latitude"));
        assert!(message.contains("-90 and 90"));
    }

    #[test]
    fn test_longitude_rejections() {
        for lon in [json!(180.5), json!("abc"), json!(null), json!(true), json!([1])] {
            let message = error_message(json!({ "lat": 0, "lon": lon }));
            assert!(message.contains("longitude"), "{}", message);
        }
        assert!(error_message(json!({ "lat": 0 })).contains("-180 and 180"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(body(json!({ "lat": -90, "lon": 180 })).validate().is_ok());
        assert!(body(json!({ "lat": 90, "lon": -180 })).validate().is_ok());
    }

    #[test]
    fn test_month_validation() {
        let message = error_message(json!({ "lat": 0, "lon": 0, "startMonth": "2021-13" }));
        assert!(message.contains("startMonth"));
        let message = error_message(json!({ "lat": 0, "lon": 0, "endMonth": "2021/06" }));
        assert!(message.contains("endMonth"));
        let message = error_message(json!({ "lat": 0, "lon": 0, "startMonth": 202106 }));
        assert!(message.contains("startMonth"));
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let query = body(json!({ "lat": 0, "lon": 0, "startMonth": "2021-06", "endMonth": "2020-01" }))
            .validate()
            .unwrap();
        assert_eq!(query.range.len(), 1);
        assert_eq!(query.range.end().to_string(), "2021-06");
    }

    #[test]
    fn test_metrics_filtered_and_deduplicated() {
        let query = body(json!({ "lat": 0, "lon": 0, "metrics": ["lst", "evi", "lst", "ndvi"] }))
            .validate()
            .unwrap();
        assert_eq!(query.metrics, vec![Metric::Lst, Metric::Ndvi]);
    }

    #[test]
    fn test_empty_metrics_rejected() {
        let message = error_message(json!({ "lat": 0, "lon": 0, "metrics": ["evi"] }));
        assert!(message.contains("metric"));
        assert!(body(json!({ "lat": 0, "lon": 0, "metrics": [] })).validate().is_err());
    }

    #[test]
    fn test_non_array_metrics_use_defaults() {
        let query = body(json!({ "lat": 0, "lon": 0, "metrics": "ndvi" })).validate().unwrap();
        assert_eq!(query.metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn test_provider_parsing() {
        let query = body(json!({ "lat": 0, "lon": 0, "provider": "VIIRS" })).validate().unwrap();
        assert_eq!(query.provider, Provider::Viirs);

        let message = error_message(json!({ "lat": 0, "lon": 0, "provider": "landsat" }));
        assert!(message.contains("landsat"));
    }

    #[test]
    fn test_coordinates_checked_before_provider() {
        let message = error_message(json!({ "lat": 100, "lon": 0, "provider": "landsat" }));
        assert!(message.contains("latitude"));
    }

    #[test]
    fn test_from_json_requires_object() {
        for raw in ["[null, 10, 20]", "\"modis\"", "42", "null", "{ not json", ""] {
            let err = MonthlyRequestBody::from_json(raw.as_bytes()).unwrap_err();
            assert_eq!(err.error_code(), Some("invalid_request"));
        }

        let query = MonthlyRequestBody::from_json(br#"{"lat": 10, "lon": 20}"#)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!((query.lat, query.lon), (10.0, 20.0));
    }
}
