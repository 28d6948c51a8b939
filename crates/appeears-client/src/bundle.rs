//! Locating and downloading a task's CSV output.

use tracing::{info, instrument};

use earthpulse_common::{ExploreError, ExploreResult};

use crate::api::AppeearsApi;
use crate::payload::{Bundle, BundleFile};

fn is_csv(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

fn has_result_hint(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("sample") || lower.contains("result")
}

/// Prefer a CSV named like a sample/result table, else the first CSV.
pub fn select_csv_file(bundle: &Bundle) -> Option<&BundleFile> {
    bundle
        .files
        .iter()
        .find(|f| is_csv(&f.file_name) && has_result_hint(&f.file_name))
        .or_else(|| bundle.files.iter().find(|f| is_csv(&f.file_name)))
}

/// Fetch the raw CSV text produced by a completed task.
#[instrument(skip(api, token))]
pub async fn fetch_result_csv(
    api: &dyn AppeearsApi,
    token: &str,
    task_id: &str,
) -> ExploreResult<String> {
    let bundle = api.bundle(token, task_id).await?;
    let file = select_csv_file(&bundle).ok_or_else(|| ExploreError::NoOutputFile {
        task_id: task_id.to_string(),
    })?;

    info!(
        file_id = %file.file_id,
        file_name = %file.file_name,
        files = bundle.files.len(),
        "Selected result file"
    );
    api.download_file(token, task_id, &file.file_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(names: &[&str]) -> Bundle {
        Bundle {
            files: names
                .iter()
                .enumerate()
                .map(|(i, name)| BundleFile {
                    file_id: format!("f{}", i),
                    file_name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_prefers_hinted_csv() {
        let b = bundle(&[
            "README.md",
            "MOD13Q1-061-granule-list.CSV",
            "earthpulse-MOD13Q1-061-results.csv",
        ]);
        assert_eq!(select_csv_file(&b).unwrap().file_id, "f2");
    }

    #[test]
    fn test_sample_hint_case_insensitive() {
        let b = bundle(&["other.csv", "Point-SAMPLE.CSV"]);
        assert_eq!(select_csv_file(&b).unwrap().file_id, "f1");
    }

    #[test]
    fn test_falls_back_to_first_csv() {
        let b = bundle(&["request.json", "granules.csv", "other.csv"]);
        assert_eq!(select_csv_file(&b).unwrap().file_id, "f1");
    }

    #[test]
    fn test_hint_without_csv_extension_ignored() {
        let b = bundle(&["results.json", "results.csv.xml"]);
        assert!(select_csv_file(&b).is_none());
    }

    #[test]
    fn test_empty_bundle() {
        assert!(select_csv_file(&Bundle::default()).is_none());
    }
}
