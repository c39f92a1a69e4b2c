//! Configuration for the miniweed client

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV: &str = "MINIWEED_CONFIG";

/// Prefix for per-key environment overrides (`MINIWEED_MASTER`, ...)
pub const ENV_PREFIX: &str = "MINIWEED";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Master (directory service) address, `host:port`
    #[serde(default = "default_master")]
    pub master: String,

    /// Filer base URLs registered up front
    #[serde(default)]
    pub filers: Vec<String>,

    /// Topology refresh period
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// HTTP connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// HTTP whole-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Preferred datacenter for reads (empty = no preference)
    #[serde(default)]
    pub datacenter: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_master() -> String {
    "127.0.0.1:9333".to_string()
}
fn default_refresh_interval() -> u64 {
    1_000
}
fn default_connect_timeout() -> u64 {
    5_000
}
fn default_request_timeout() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            master: default_master(),
            filers: Vec::new(),
            refresh_interval_ms: default_refresh_interval(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            datacenter: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `master` with every other field defaulted
    pub fn with_master(master: impl Into<String>) -> Self {
        Self {
            master: master.into(),
            ..Default::default()
        }
    }

    /// Load from the file named by `MINIWEED_CONFIG` (if any), then apply
    /// `MINIWEED_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::var(CONFIG_ENV).ok().as_deref())
    }

    /// Load from an explicit file path (missing file is not an error), then
    /// apply environment overrides.
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::new(path, config::FileFormat::Toml).required(false),
            );
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("filers"),
            )
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.master.trim().is_empty() {
            return Err(Error::InvalidConfig("master address is empty".into()));
        }
        if self.refresh_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "refresh_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Shared HTTP client honouring the configured timeouts
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout())
            .timeout(self.request_timeout())
            .build()
            .map_err(Error::from)
    }
}
