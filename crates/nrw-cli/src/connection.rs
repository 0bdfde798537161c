//! Connection settings shared by every command

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use nrw_core::{Config, NodeRedWrapper, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use tracing_subscriber::EnvFilter;

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the Node-RED admin API
    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Bearer token sent with every request
    #[arg(long, global = true, value_name = "TOKEN")]
    pub key: Option<String>,

    /// Request timeout in seconds; 0 disables it
    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Log requests and payloads
    #[arg(long, global = true)]
    pub debug: bool,
}

impl ConnectionArgs {
    pub fn config(&self) -> Config {
        let mut config = Config::new(&self.url)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_debug(self.debug);
        if let Some(key) = &self.key {
            config = config.with_api_key(key);
        }
        config
    }

    pub fn wrapper(&self) -> Result<NodeRedWrapper> {
        NodeRedWrapper::new(self.config()).context("Failed to create wrapper")
    }

    /// Install the global subscriber; `RUST_LOG` wins over `--debug`
    pub fn init_tracing(&self) {
        let default_level = if self.debug { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
