//! AppEEARS wire payloads.
//!
//! The service answers several endpoints with more than one JSON shape
//! (layer catalogs as objects or arrays, status as an object or a
//! singleton array, quality layer lists as arrays or loosely quoted
//! strings). Each shape is decoded into an explicit enum here so the
//! resolvers downstream never probe raw JSON.

use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// Coercion helpers
// ============================================================================

/// Read a finite number from a JSON number or numeric string.
pub fn number_from(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Read a boolean flag from `true`, a non-zero number or the string `"true"`.
pub fn flag_from(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}

/// Render a scalar as text; strings pass through unquoted.
fn text_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(text_from)
        .filter(|s| !s.trim().is_empty())
}

// ============================================================================
// Product layer catalog
// ============================================================================

/// Declared companion quality layers of a data layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QualityLayers {
    #[default]
    Absent,
    /// A real JSON array.
    List(Vec<String>),
    /// A string: `"['a', 'b']"`, `"[\"a\"]"` or `"a, b"`.
    Text(String),
}

impl QualityLayers {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => QualityLayers::Absent,
            Some(Value::Array(items)) => {
                QualityLayers::List(items.iter().filter_map(text_from).collect())
            }
            Some(Value::String(s)) => QualityLayers::Text(s.clone()),
            Some(other) => match text_from(other) {
                Some(s) => QualityLayers::Text(s),
                None => QualityLayers::Absent,
            },
        }
    }

    /// Candidate layer names, trimmed, blanks dropped.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            QualityLayers::Absent => Vec::new(),
            QualityLayers::List(items) => clean_names(items.iter().map(String::as_str)),
            QualityLayers::Text(raw) => parse_quality_text(raw),
        }
    }
}

fn clean_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_quality_text(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    // Python-style lists arrive single-quoted
    if raw.starts_with('[') {
        let normalized = raw.replace('\'', "\"");
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(&normalized) {
            let names: Vec<String> = items.iter().filter_map(text_from).collect();
            return clean_names(names.iter().map(String::as_str));
        }
    }

    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"'))
        .collect();
    clean_names(stripped.split(','))
}

/// Metadata the resolvers and aggregator need from one catalog layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerMetadata {
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub fill_value: Option<f64>,
    pub quality_layers: QualityLayers,
    pub is_qa: bool,
}

impl LayerMetadata {
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::default();
        };

        Self {
            scale_factor: fields.get("ScaleFactor").and_then(number_from),
            add_offset: fields.get("AddOffset").and_then(number_from),
            fill_value: fields.get("FillValue").and_then(number_from),
            quality_layers: QualityLayers::from_value(fields.get("QualityLayers")),
            is_qa: fields.get("IsQA").is_some_and(flag_from),
        }
    }
}

/// A named layer in a product catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLayer {
    pub name: String,
    pub metadata: LayerMetadata,
}

/// Raw catalog shapes returned by `GET /product/{product}`.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogPayload {
    /// `{ "<layer>": { ...metadata } }`
    Object(Map<String, Value>),
    /// `[ { "Layer": "<layer>", ...metadata } ]`
    Array(Vec<Value>),
    Unrecognized,
}

impl CatalogPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => CatalogPayload::Object(map),
            Value::Array(items) => CatalogPayload::Array(items),
            _ => CatalogPayload::Unrecognized,
        }
    }
}

/// Product layers in catalog order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerCatalog {
    layers: Vec<CatalogLayer>,
}

impl LayerCatalog {
    pub fn new(layers: Vec<CatalogLayer>) -> Self {
        Self { layers }
    }

    pub fn from_value(value: Value) -> Self {
        Self::from_payload(CatalogPayload::from_value(value))
    }

    pub fn from_payload(payload: CatalogPayload) -> Self {
        let mut catalog = Self::default();
        match payload {
            CatalogPayload::Object(map) => {
                for (name, meta) in map {
                    catalog.insert(name, LayerMetadata::from_value(&meta));
                }
            }
            CatalogPayload::Array(items) => {
                for item in items {
                    if let Some(name) = non_empty_string(item.get("Layer")) {
                        catalog.insert(name, LayerMetadata::from_value(&item));
                    }
                }
            }
            CatalogPayload::Unrecognized => {}
        }
        catalog
    }

    /// Later duplicates replace metadata but keep the first position.
    fn insert(&mut self, name: String, metadata: LayerMetadata) {
        match self.layers.iter_mut().find(|l| l.name == name) {
            Some(existing) => existing.metadata = metadata,
            None => self.layers.push(CatalogLayer { name, metadata }),
        }
    }

    pub fn layers(&self) -> &[CatalogLayer] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_ignore_case(&self, name: &str) -> Option<&CatalogLayer> {
        let wanted = name.to_lowercase();
        self.layers.iter().find(|l| l.name.to_lowercase() == wanted)
    }

    /// Exact match first, then case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<&CatalogLayer> {
        self.get(name).or_else(|| self.get_ignore_case(name))
    }
}

// ============================================================================
// Quality legend
// ============================================================================

/// One entry of `GET /quality/{product}/{layer}`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityEntry {
    pub value: Option<f64>,
    pub acceptable: bool,
}

impl QualityEntry {
    pub fn from_value(value: &Value) -> Self {
        Self {
            value: value.get("Value").and_then(number_from),
            acceptable: value.get("Acceptable").is_some_and(flag_from),
        }
    }

    /// A non-array legend is treated as empty.
    pub fn list_from_value(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Body of `POST /task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRequest {
    pub task_type: String,
    pub task_name: String,
    pub params: TaskParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskParams {
    pub dates: Vec<DateWindow>,
    pub layers: Vec<LayerRef>,
    pub coordinates: Vec<TaskCoordinate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start_date: String,
    pub end_date: String,
}

/// A (product, layer) pair requested from a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LayerRef {
    pub product: String,
    pub layer: String,
}

impl LayerRef {
    pub fn new(product: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            layer: layer.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCoordinate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response of `POST /task`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSubmission {
    pub task_id: Option<String>,
}

impl TaskSubmission {
    pub fn from_value(value: &Value) -> Self {
        Self {
            task_id: non_empty_string(value.get("task_id")),
        }
    }
}

/// Response of `GET /status/{task_id}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusPayload {
    Object(Map<String, Value>),
    /// Only the first element is consulted.
    Array(Vec<Value>),
    Empty,
}

impl StatusPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => StatusPayload::Object(map),
            Value::Array(items) => StatusPayload::Array(items),
            _ => StatusPayload::Empty,
        }
    }

    /// Lowercased `status`, else `state`, else `"pending"`.
    pub fn status(&self) -> String {
        let fields = match self {
            StatusPayload::Object(map) => Some(map),
            StatusPayload::Array(items) => items.first().and_then(Value::as_object),
            StatusPayload::Empty => None,
        };

        fields
            .and_then(|f| non_empty_string(f.get("status")).or_else(|| non_empty_string(f.get("state"))))
            .unwrap_or_else(|| "pending".to_string())
            .to_lowercase()
    }
}

// ============================================================================
// Bundles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BundleFile {
    pub file_id: String,
    pub file_name: String,
}

/// Response of `GET /bundle/{task_id}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bundle {
    pub files: Vec<BundleFile>,
}

impl Bundle {
    pub fn from_value(value: &Value) -> Self {
        let files = value
            .get("files")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(BundleFile {
                            file_id: non_empty_string(item.get("file_id"))?,
                            file_name: item.get("file_name").and_then(text_from).unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { files }
    }
}
