//! Common AppEEARS fixtures.
//!
//! Payloads mirror what the AppEEARS API returns for the MODIS products
//! in the built-in provider table, trimmed to the fields the pipeline reads.

use serde_json::{json, Value};

/// Product codes and layer names used across fixtures.
pub mod products {
    pub const MODIS_NDVI: &str = "MOD13Q1.061";
    pub const MODIS_LST: &str = "MOD11A2.061";

    pub const NDVI_LAYER: &str = "_250m_16_days_NDVI";
    pub const NDVI_QA_LAYER: &str = "_250m_16_days_VI_Quality";
    pub const LST_LAYER: &str = "LST_Day_1km";
    pub const LST_QA_LAYER: &str = "QC_Day";
}

/// MOD13Q1 catalog in the object-map shape.
pub fn modis_ndvi_catalog() -> Value {
    json!({
        "_250m_16_days_EVI": {
            "AddOffset": 0.0,
            "FillValue": -3000,
            "IsQA": false,
            "Layer": "_250m_16_days_EVI",
            "QualityLayers": "['_250m_16_days_VI_Quality']",
            "ScaleFactor": 0.0001
        },
        "_250m_16_days_NDVI": {
            "AddOffset": 0.0,
            "FillValue": -3000,
            "IsQA": false,
            "Layer": "_250m_16_days_NDVI",
            "QualityLayers": "['_250m_16_days_VI_Quality']",
            "ScaleFactor": 0.0001
        },
        "_250m_16_days_VI_Quality": {
            "AddOffset": "",
            "FillValue": 65535,
            "IsQA": true,
            "Layer": "_250m_16_days_VI_Quality",
            "QualityLayers": "",
            "ScaleFactor": ""
        },
        "_250m_16_days_pixel_reliability": {
            "FillValue": -1,
            "IsQA": true,
            "Layer": "_250m_16_days_pixel_reliability"
        }
    })
}

/// MOD11A2 catalog in the array shape.
pub fn modis_lst_catalog() -> Value {
    json!([
        {
            "Layer": "LST_Day_1km",
            "AddOffset": 0.0,
            "FillValue": 0,
            "IsQA": false,
            "QualityLayers": "['QC_Day']",
            "ScaleFactor": 0.02
        },
        {
            "Layer": "LST_Night_1km",
            "AddOffset": 0.0,
            "FillValue": 0,
            "IsQA": false,
            "QualityLayers": "['QC_Night']",
            "ScaleFactor": 0.02
        },
        { "Layer": "QC_Day", "IsQA": true, "FillValue": "" },
        { "Layer": "QC_Night", "IsQA": true, "FillValue": "" }
    ])
}

/// Legend for `_250m_16_days_VI_Quality`.
pub fn ndvi_quality_legend() -> Value {
    json!([
        { "Value": 2112, "Acceptable": true, "Description": "good" },
        { "Value": "2116", "Acceptable": true, "Description": "good, adjacent cloud" },
        { "Value": 4160, "Acceptable": false, "Description": "cloudy" },
        { "Value": null, "Acceptable": true }
    ])
}

/// Legend for `QC_Day`.
pub fn lst_quality_legend() -> Value {
    json!([
        { "Value": 0, "Acceptable": true },
        { "Value": 65, "Acceptable": false },
        { "Value": 2, "Acceptable": false }
    ])
}

/// Bundle listing with a granule list and the point results table.
pub fn result_bundle(csv_file_id: &str) -> Value {
    json!({
        "files": [
            { "file_id": "granules", "file_name": "MOD13Q1-061-granule-list.txt", "file_type": "txt" },
            { "file_id": "request", "file_name": "earthpulse-request.json", "file_type": "json" },
            { "file_id": csv_file_id, "file_name": "earthpulse-MOD13Q1-061-results.csv", "file_type": "csv" }
        ],
        "task_id": "fake-task"
    })
}

/// Builds extraction-result CSV text row by row.
#[derive(Debug, Clone)]
pub struct CsvBuilder {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            header: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Header used by MODIS NDVI point results.
    pub fn modis_ndvi() -> Self {
        Self::new(&[
            "ID",
            "Latitude",
            "Longitude",
            "Date",
            products::NDVI_LAYER,
            products::NDVI_QA_LAYER,
        ])
    }

    /// NDVI row at the fixture point.
    pub fn ndvi_row(self, date: &str, value: &str, qa: &str) -> Self {
        self.row(&["explore-point-1", "36.97", "-122.03", date, value, qa])
    }

    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header.join(","));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_builder() {
        let csv = CsvBuilder::new(&["Date", "v"]).row(&["2021-06-10", "1"]).build();
        assert_eq!(csv, "Date,v\n2021-06-10,1\n");
    }

    #[test]
    fn test_bundle_contains_csv() {
        let bundle = result_bundle("abc");
        let names: Vec<&str> = bundle["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["file_name"].as_str().unwrap())
            .collect();
        assert!(names.iter().any(|n| n.ends_with(".csv")));
    }
}
