//! Provider/metric → AppEEARS product table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use earthpulse_common::{Metric, Provider};

/// Table shipped with the crate; also the fallback when no file is configured.
pub const BUILTIN_PROVIDERS_YAML: &str = include_str!("../config/providers.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read provider config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse provider config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid layer pattern '{pattern}' for {provider}/{metric}: {source}")]
    InvalidPattern {
        provider: Provider,
        metric: Metric,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// `providers.yaml` as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersFile {
    pub providers: BTreeMap<Provider, BTreeMap<Metric, MetricSourceConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSourceConfig {
    /// AppEEARS product code, e.g. `MOD13Q1.061`.
    pub product: String,
    #[serde(default)]
    pub preferred_layers: Vec<String>,
    #[serde(default)]
    pub layer_patterns: Vec<String>,
}

/// Where one metric of one provider comes from.
#[derive(Debug, Clone)]
pub struct MetricSource {
    pub product: String,
    pub preferred_layers: Vec<String>,
    pub layer_patterns: Vec<Regex>,
}

/// Compiled provider table.
#[derive(Debug, Clone)]
pub struct ProviderTable {
    sources: HashMap<(Provider, Metric), MetricSource>,
}

impl ProviderTable {
    /// The table shipped in `config/providers.yaml`.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_PROVIDERS_YAML)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ProvidersFile = serde_yaml::from_str(content)?;
        Self::compile(file)
    }

    /// Load from a file, falling back to the built-in table when it is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Provider config not found, using built-in table"
            );
            return Self::builtin();
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = table.sources.len(),
            "Loaded provider config"
        );
        Ok(table)
    }

    fn compile(file: ProvidersFile) -> Result<Self, ConfigError> {
        let mut sources = HashMap::new();
        for (provider, metrics) in file.providers {
            for (metric, config) in metrics {
                let layer_patterns = config
                    .layer_patterns
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                            provider,
                            metric,
                            pattern: pattern.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                sources.insert(
                    (provider, metric),
                    MetricSource {
                        product: config.product,
                        preferred_layers: config.preferred_layers,
                        layer_patterns,
                    },
                );
            }
        }
        Ok(Self { sources })
    }

    pub fn source(&self, provider: Provider, metric: Metric) -> Option<&MetricSource> {
        self.sources.get(&(provider, metric))
    }
}
