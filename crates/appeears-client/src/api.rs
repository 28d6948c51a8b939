//! AppEEARS REST API access.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use earthpulse_common::{ExploreError, ExploreResult};

use crate::payload::{Bundle, LayerCatalog, QualityEntry, StatusPayload, TaskRequest, TaskSubmission};

/// Default AppEEARS endpoint.
pub const DEFAULT_BASE_URL: &str = "https://appeears.earthdatacloud.nasa.gov/api";

/// Earthdata login passed through to AppEEARS.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both values must be present and non-blank.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        let username = username.filter(|u| !u.trim().is_empty())?;
        let password = password.filter(|p| !p.is_empty())?;
        Some(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Operations the explore pipeline needs from AppEEARS.
#[async_trait]
pub trait AppeearsApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> ExploreResult<String>;

    /// List the layers of a product.
    async fn product_layers(&self, token: &str, product: &str) -> ExploreResult<LayerCatalog>;

    /// Fetch the legal values of a quality layer.
    async fn quality_legend(
        &self,
        token: &str,
        product: &str,
        layer: &str,
    ) -> ExploreResult<Vec<QualityEntry>>;

    /// Submit a point-extraction task.
    async fn submit_task(&self, token: &str, request: &TaskRequest) -> ExploreResult<TaskSubmission>;

    /// Read the current status of a task.
    async fn task_status(&self, token: &str, task_id: &str) -> ExploreResult<StatusPayload>;

    /// List the output files of a completed task.
    async fn bundle(&self, token: &str, task_id: &str) -> ExploreResult<Bundle>;

    /// Download one bundle file as text.
    async fn download_file(&self, token: &str, task_id: &str, file_id: &str) -> ExploreResult<String>;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// reqwest-backed AppEEARS client.
pub struct HttpAppeearsClient {
    client: Client,
    base_url: String,
}

impl HttpAppeearsClient {
    pub fn new(config: ClientConfig) -> ExploreResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ExploreError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request; non-success statuses become `ExploreError::Remote`.
    async fn send(&self, request: RequestBuilder) -> ExploreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ExploreError::RemoteTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExploreError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json(&self, token: &str, path: &str) -> ExploreResult<Value> {
        debug!(path = %path, "AppEEARS GET");
        let response = self
            .send(self.client.get(self.url(path)).bearer_auth(token))
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> ExploreResult<Value> {
    response
        .json::<Value>()
        .await
        .map_err(|e| ExploreError::RemoteTransport(format!("invalid JSON body: {}", e)))
}

#[async_trait]
impl AppeearsApi for HttpAppeearsClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> ExploreResult<String> {
        let response = self
            .client
            .post(self.url("/login"))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| ExploreError::RemoteTransport(e.to_string()))?;

        let ok = response.status().is_success();
        let payload = response.json::<Value>().await.unwrap_or(Value::Null);
        let token = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match token {
            Some(token) if ok => Ok(token.to_string()),
            _ => {
                let message = payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("credentials rejected");
                Err(ExploreError::Authentication(message.to_string()))
            }
        }
    }

    #[instrument(skip(self, token))]
    async fn product_layers(&self, token: &str, product: &str) -> ExploreResult<LayerCatalog> {
        let value = self.get_json(token, &format!("/product/{}", product)).await?;
        Ok(LayerCatalog::from_value(value))
    }

    #[instrument(skip(self, token))]
    async fn quality_legend(
        &self,
        token: &str,
        product: &str,
        layer: &str,
    ) -> ExploreResult<Vec<QualityEntry>> {
        let value = self
            .get_json(token, &format!("/quality/{}/{}", product, layer))
            .await?;
        Ok(QualityEntry::list_from_value(&value))
    }

    #[instrument(skip(self, token, request), fields(task_name = %request.task_name))]
    async fn submit_task(&self, token: &str, request: &TaskRequest) -> ExploreResult<TaskSubmission> {
        let response = self
            .send(
                self.client
                    .post(self.url("/task"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await?;
        let value = read_json(response).await?;
        Ok(TaskSubmission::from_value(&value))
    }

    #[instrument(skip(self, token))]
    async fn task_status(&self, token: &str, task_id: &str) -> ExploreResult<StatusPayload> {
        let value = self.get_json(token, &format!("/status/{}", task_id)).await?;
        Ok(StatusPayload::from_value(value))
    }

    #[instrument(skip(self, token))]
    async fn bundle(&self, token: &str, task_id: &str) -> ExploreResult<Bundle> {
        let value = self.get_json(token, &format!("/bundle/{}", task_id)).await?;
        Ok(Bundle::from_value(&value))
    }

    #[instrument(skip(self, token))]
    async fn download_file(&self, token: &str, task_id: &str, file_id: &str) -> ExploreResult<String> {
        let response = self
            .send(
                self.client
                    .get(self.url(&format!("/bundle/{}/{}", task_id, file_id)))
                    .bearer_auth(token),
            )
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| ExploreError::RemoteTransport(e.to_string()))?;
        debug!(bytes = text.len(), "Downloaded bundle file");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(Credentials::from_parts(Some("user".into()), Some("pw".into())).is_some());
        assert!(Credentials::from_parts(None, Some("pw".into())).is_none());
        assert!(Credentials::from_parts(Some("user".into()), None).is_none());
        assert!(Credentials::from_parts(Some("  ".into()), Some("pw".into())).is_none());
        assert!(Credentials::from_parts(Some("user".into()), Some(String::new())).is_none());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::from_parts(Some("user".into()), Some("hunter2".into())).unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpAppeearsClient::new(ClientConfig {
            base_url: "http://localhost:9999/api/".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/login"), "http://localhost:9999/api/login");
    }
}
