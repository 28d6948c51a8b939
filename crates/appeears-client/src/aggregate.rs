//! Monthly aggregation of extracted observations.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use earthpulse_common::{Month, MonthRange, SeriesPoint};

use crate::metric::MetricDefinition;
use crate::tabular::Record;

/// Observations of one metric within one month.
#[derive(Debug, Clone, Default)]
struct MetricTally {
    /// Transformed values that passed QA, fill and parse checks
    accepted: Vec<f64>,
    /// Rows carrying both the data and QA columns
    total: usize,
}

impl MetricTally {
    fn acceptance_ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.accepted.len() as f64 / self.total as f64)
    }
}

/// Per-month, per-metric tallies for one request.
#[derive(Debug, Clone)]
struct MonthBucket {
    month: Month,
    tallies: Vec<MetricTally>,
}

/// Aggregate records into one series point per month of `range`.
///
/// Rows outside the range or without a parsable date are skipped.
pub fn aggregate_monthly(
    records: &[Record],
    range: &MonthRange,
    definitions: &[MetricDefinition],
) -> Vec<SeriesPoint> {
    let mut buckets: Vec<MonthBucket> = range
        .iter()
        .map(|month| MonthBucket {
            month,
            tallies: vec![MetricTally::default(); definitions.len()],
        })
        .collect();

    for record in records {
        let Some(slot) = extract_month(record).and_then(|m| range.position(m)) else {
            continue;
        };
        let bucket = &mut buckets[slot];

        for (def, tally) in definitions.iter().zip(bucket.tallies.iter_mut()) {
            let (Some(data_raw), Some(qa_raw)) = (record.get(&def.data_layer), record.get(&def.qa_layer))
            else {
                continue;
            };
            tally.total += 1;

            if let Some(value) = accepted_value(def, data_raw, qa_raw) {
                tally.accepted.push(value);
            }
        }
    }

    buckets
        .into_iter()
        .map(|bucket| summarize(bucket, definitions))
        .collect()
}

/// Transformed value when the observation passes QA, parse and fill checks.
fn accepted_value(def: &MetricDefinition, data_raw: &str, qa_raw: &str) -> Option<f64> {
    if !def.acceptable_qa.accepts(qa_raw) {
        return None;
    }
    let raw = parse_finite(data_raw)?;
    if def.is_fill(raw) {
        return None;
    }
    Some(def.transform(raw))
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn summarize(bucket: MonthBucket, definitions: &[MetricDefinition]) -> SeriesPoint {
    let mut point = SeriesPoint::empty(bucket.month);
    let mut ratios = Vec::new();

    for (def, tally) in definitions.iter().zip(&bucket.tallies) {
        if let Some(value) = median(&tally.accepted) {
            point.set_value(def.metric, round_to(value, 6));
            point.count = point.count.max(tally.accepted.len());
        }
        if let Some(ratio) = tally.acceptance_ratio() {
            ratios.push(ratio);
        }
    }

    if !ratios.is_empty() {
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        point.qa_score = Some(round_to(mean, 3));
    }
    point
}

/// Middle sorted value, or the mean of the two middles for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Month of a record, from its first date-like column.
pub fn extract_month(record: &Record) -> Option<Month> {
    let (_, raw) = record.date_field()?;
    parse_observation_date(raw).map(|date| Month::from_date(&date))
}

/// General date parsing with a literal `MM-DD-YYYY` fallback.
pub fn parse_observation_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ndt.date());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    parse_mdy_dashed(raw)
}

/// Literal `MM-DD-YYYY` as written in AppEEARS task dates.
fn parse_mdy_dashed(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && raw
            .char_indices()
            .all(|(i, c)| i == 2 || i == 5 || c.is_ascii_digit());
    if !shaped {
        return None;
    }

    let month: u32 = raw[0..2].parse().ok()?;
    let day: u32 = raw[3..5].parse().ok()?;
    let year: i32 = raw[6..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(2.0 / 3.0, 3), 0.667);
        assert_eq!(round_to(0.5, 3), 0.5);
    }

    #[test]
    fn test_parse_observation_dates() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 10);
        assert_eq!(parse_observation_date("2021-06-10"), expected);
        assert_eq!(parse_observation_date("2021-06-10T00:00:00Z"), expected);
        assert_eq!(parse_observation_date("2021-06-10T12:30:00"), expected);
        assert_eq!(parse_observation_date("2021/06/10"), expected);
        assert_eq!(parse_observation_date("06/10/2021"), expected);
        assert_eq!(parse_observation_date("06-10-2021"), expected);
        assert_eq!(parse_observation_date(" 2021-06-10 "), expected);
    }

    #[test]
    fn test_unparsable_dates() {
        assert_eq!(parse_observation_date(""), None);
        assert_eq!(parse_observation_date("June 2021"), None);
        assert_eq!(parse_observation_date("13-40-2021"), None);
        assert_eq!(parse_observation_date("6-1-2021"), None);
    }

    #[test]
    fn test_extract_month_uses_first_date_column() {
        let record = Record::new(vec![
            ("ID".into(), "explore-point-1".into()),
            ("Date".into(), "2021-07-28".into()),
            ("Update_Date".into(), "2022-01-01".into()),
        ]);
        assert_eq!(extract_month(&record), Some(Month::parse("2021-07").unwrap()));

        let no_date = Record::new(vec![("ID".into(), "x".into())]);
        assert_eq!(extract_month(&no_date), None);
    }
}
