//! Application state for the Explore API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;

use appeears_client::{AppeearsApi, Credentials, HttpAppeearsClient, PollConfig, ProviderTable};

use crate::config::ExploreConfig;

/// Shared application state.
pub struct AppState {
    /// AppEEARS access; a fake in tests.
    pub api: Arc<dyn AppeearsApi>,

    pub credentials: Option<Credentials>,

    /// Provider/metric to product table.
    pub providers: ProviderTable,

    pub poll: PollConfig,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        api: Arc<dyn AppeearsApi>,
        credentials: Option<Credentials>,
        providers: ProviderTable,
        poll: PollConfig,
    ) -> Self {
        Self {
            api,
            credentials,
            providers,
            poll,
            prometheus: None,
        }
    }

    /// Build state backed by the real AppEEARS service.
    pub fn from_config(config: &ExploreConfig) -> Result<Self> {
        let client = HttpAppeearsClient::new(config.client.clone())
            .context("Failed to create AppEEARS client")?;
        let providers = ProviderTable::load(&config.providers_path).with_context(|| {
            format!(
                "Failed to load provider config {}",
                config.providers_path.display()
            )
        })?;

        if config.credentials.is_none() {
            tracing::warn!("APPEEARS_USERNAME/APPEEARS_PASSWORD not set; monthly requests will return 501");
        }

        Ok(Self::new(
            Arc::new(client),
            config.credentials.clone(),
            providers,
            config.poll.clone(),
        ))
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
