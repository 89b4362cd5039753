use std::time::Duration;

use clap::Parser;
use spot_handler::Provider;
use spot_handler_castai::{CastConfig, DEFAULT_TIMEOUT};
use time::ext::NumericalStdDuration as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Marks this node unschedulable and notifies CAST AI when the cloud
/// provider announces a spot interruption.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Config {
    /// CAST AI API base URL.
    #[arg(long, env = "API_URL", default_value = "https://api.cast.ai")]
    pub(crate) api_url: String,

    /// CAST AI API key.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub(crate) api_key: String,

    /// CAST AI cluster identifier.
    #[arg(long, env = "CLUSTER_ID")]
    pub(crate) cluster_id: String,

    /// Name of the Kubernetes Node this handler runs on.
    #[arg(long, env = "NODE_NAME")]
    pub(crate) node_name: String,

    /// Cloud provider: azure or gcp.
    #[arg(long, env = "PROVIDER")]
    pub(crate) provider: Provider,

    #[arg(
        long,
        env = "POLL_INTERVAL_SECONDS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) poll_interval_seconds: u64,

    /// Log filter, e.g. `debug` or `spot_handler=trace`. Falls back to `RUST_LOG`.
    #[arg(long, env = "LOG_LEVEL")]
    pub(crate) log_level: Option<String>,

    /// Port for the `/healthz` endpoint. Disabled when unset.
    #[arg(long, env = "HTTP_PORT")]
    pub(crate) http_port: Option<u16>,
}

impl Config {
    pub(crate) fn parse_args() -> Self {
        Self::parse()
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval_seconds.std_seconds()
    }

    pub(crate) fn cast_config(&self, version: &str) -> CastConfig {
        CastConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            cluster_id: self.cluster_id.clone(),
            timeout: DEFAULT_TIMEOUT,
            version: version.to_string(),
        }
    }

    pub(crate) fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        match &self.log_level {
            Some(level) => EnvFilter::try_new(level),
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        }
    }
}
