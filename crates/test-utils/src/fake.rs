//! In-memory AppEEARS used by pipeline and router tests.
//!
//! Responses are scripted up front with the `with_*` builders. Every call
//! is recorded so tests can assert which endpoints were (or were not) hit.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use appeears_client::payload::TaskSubmission;
use appeears_client::{
    AppeearsApi, Bundle, Credentials, LayerCatalog, QualityEntry, StatusPayload, TaskRequest,
};
use earthpulse_common::{ExploreError, ExploreResult};

/// How the fake answers `login`.
#[derive(Debug, Clone)]
pub enum LoginBehavior {
    Token(String),
    Reject(String),
}

pub struct FakeAppeears {
    login: LoginBehavior,
    catalogs: HashMap<String, Value>,
    legends: HashMap<(String, String), Value>,
    task_id: Option<String>,
    statuses: Mutex<VecDeque<Value>>,
    last_status: Mutex<Value>,
    bundle: Value,
    files: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    last_request: Mutex<Option<Value>>,
}

impl Default for FakeAppeears {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAppeears {
    pub fn new() -> Self {
        Self {
            login: LoginBehavior::Token("fake-token".to_string()),
            catalogs: HashMap::new(),
            legends: HashMap::new(),
            task_id: Some("task-123".to_string()),
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(json!({ "status": "pending" })),
            bundle: json!({ "files": [] }),
            files: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_catalog(mut self, product: &str, catalog: Value) -> Self {
        self.catalogs.insert(product.to_string(), catalog);
        self
    }

    pub fn with_legend(mut self, product: &str, layer: &str, legend: Value) -> Self {
        self.legends
            .insert((product.to_string(), layer.to_string()), legend);
        self
    }

    /// Status payloads returned in order; the last one repeats.
    pub fn with_statuses(self, statuses: Vec<Value>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_bundle(mut self, bundle: Value) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn with_file(mut self, file_id: &str, text: impl Into<String>) -> Self {
        self.files.insert(file_id.to_string(), text.into());
        self
    }

    pub fn rejecting_login(mut self, message: &str) -> Self {
        self.login = LoginBehavior::Reject(message.to_string());
        self
    }

    /// Task submissions succeed but carry no `task_id`.
    pub fn without_task_id(mut self) -> Self {
        self.task_id = None;
        self
    }

    /// Every call made so far, formatted as `"endpoint:args"`.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// The most recent task body, as it would have been sent on the wire.
    pub fn last_task_request(&self) -> Option<Value> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found(what: String) -> ExploreError {
        ExploreError::Remote {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

#[async_trait]
impl AppeearsApi for FakeAppeears {
    async fn login(&self, credentials: &Credentials) -> ExploreResult<String> {
        self.record(format!("login:{}", credentials.username));
        match &self.login {
            LoginBehavior::Token(token) => Ok(token.clone()),
            LoginBehavior::Reject(message) => Err(ExploreError::Authentication(message.clone())),
        }
    }

    async fn product_layers(&self, _token: &str, product: &str) -> ExploreResult<LayerCatalog> {
        self.record(format!("product:{}", product));
        let catalog = self
            .catalogs
            .get(product)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("product {}", product)))?;
        Ok(LayerCatalog::from_value(catalog))
    }

    async fn quality_legend(
        &self,
        _token: &str,
        product: &str,
        layer: &str,
    ) -> ExploreResult<Vec<QualityEntry>> {
        self.record(format!("quality:{}/{}", product, layer));
        let legend = self
            .legends
            .get(&(product.to_string(), layer.to_string()))
            .ok_or_else(|| Self::not_found(format!("quality layer {}/{}", product, layer)))?;
        Ok(QualityEntry::list_from_value(legend))
    }

    async fn submit_task(&self, _token: &str, request: &TaskRequest) -> ExploreResult<TaskSubmission> {
        self.record(format!("task:{}", request.task_name));
        *self.last_request.lock().unwrap() = serde_json::to_value(request).ok();
        Ok(TaskSubmission {
            task_id: self.task_id.clone(),
        })
    }

    async fn task_status(&self, _token: &str, task_id: &str) -> ExploreResult<StatusPayload> {
        self.record(format!("status:{}", task_id));
        let next = self.statuses.lock().unwrap().pop_front();
        let mut last = self.last_status.lock().unwrap();
        if let Some(next) = next {
            *last = next;
        }
        Ok(StatusPayload::from_value(last.clone()))
    }

    async fn bundle(&self, _token: &str, task_id: &str) -> ExploreResult<Bundle> {
        self.record(format!("bundle:{}", task_id));
        Ok(Bundle::from_value(&self.bundle))
    }

    async fn download_file(&self, _token: &str, task_id: &str, file_id: &str) -> ExploreResult<String> {
        self.record(format!("download:{}/{}", task_id, file_id));
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("file {}", file_id)))
    }
}
