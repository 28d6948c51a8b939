//! Service configuration from command line and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use appeears_client::{ClientConfig, Credentials, PollConfig, DEFAULT_BASE_URL};

/// Explore API Server
#[derive(Parser, Debug, Clone)]
#[command(name = "explore-api")]
#[command(about = "Monthly NDVI/LST point series backed by NASA AppEEARS")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8090", env = "EXPLORE_LISTEN_ADDR")]
    pub listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// AppEEARS API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "APPEEARS_BASE_URL")]
    pub appeears_url: String,

    /// Earthdata username
    #[arg(long, env = "APPEEARS_USERNAME")]
    pub username: Option<String>,

    /// Earthdata password
    #[arg(long, env = "APPEEARS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds between task status checks
    #[arg(long, default_value = "6", env = "APPEEARS_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: u64,

    /// Status checks before a task is reported as timed out
    #[arg(long, default_value = "45", env = "APPEEARS_POLL_MAX_ATTEMPTS")]
    pub poll_max_attempts: u32,

    /// Per-request timeout for AppEEARS calls
    #[arg(long, default_value = "60", env = "APPEEARS_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Provider/product table
    #[arg(long, default_value = "config/providers.yaml", env = "EXPLORE_PROVIDERS_CONFIG")]
    pub providers_config: PathBuf,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    pub listen: String,
    pub client: ClientConfig,
    /// `None` when either half is missing; requests then fail with 501.
    pub credentials: Option<Credentials>,
    pub poll: PollConfig,
    pub providers_path: PathBuf,
}

impl ExploreConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            listen: args.listen.clone(),
            client: ClientConfig {
                base_url: args.appeears_url.clone(),
                request_timeout: Duration::from_secs(args.request_timeout_secs),
            },
            credentials: Credentials::from_parts(args.username.clone(), args.password.clone()),
            poll: PollConfig {
                interval: Duration::from_secs(args.poll_interval_secs),
                // At least one status check, or no task could ever finish
                max_attempts: args.poll_max_attempts.max(1),
            },
            providers_path: args.providers_config.clone(),
        }
    }
}
