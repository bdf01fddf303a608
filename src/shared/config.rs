//! Application configuration. Endpoint, log target, paths. Read once at startup.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Log store target (table name). Read from RELAY_LOG_TABLE or LOG_TABLE.
    #[serde(default)]
    pub log_table: Option<String>,

    /// Remote endpoint name. Read from RELAY_ENDPOINT_NAME or SAGEMAKER_ENDPOINT.
    #[serde(default)]
    pub endpoint_name: Option<String>,

    /// Base URL of the inference runtime. Read from RELAY_RUNTIME_URL.
    #[serde(default)]
    pub runtime_url: Option<String>,

    /// Optional bearer token for the inference runtime. Read from RELAY_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Directory holding the log database. Read from RELAY_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Client-side invocation timeout. Unset means no timeout. Read from RELAY_INVOKE_TIMEOUT_SECS.
    #[serde(default)]
    pub invoke_timeout_secs: Option<u64>,

    /// Request id of this invocation. Generated when unset. Read from RELAY_REQUEST_ID.
    #[serde(default)]
    pub request_id: Option<String>,

    /// Region used for the default runtime URL. Read from AWS_REGION.
    #[serde(default)]
    pub region: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("RELAY"));
        if let Ok(path) = std::env::var("RELAY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed names kept for deployments that already set them.
        if cfg.log_table.is_none() {
            cfg.log_table = non_empty_env("LOG_TABLE");
        }
        if cfg.endpoint_name.is_none() {
            cfg.endpoint_name = non_empty_env("SAGEMAKER_ENDPOINT");
        }
        if cfg.region.is_none() {
            cfg.region = non_empty_env("AWS_REGION");
        }
        Ok(cfg)
    }

    /// Log table name, if set and non-empty.
    pub fn log_table(&self) -> Option<&str> {
        self.log_table.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Endpoint name, if set and non-empty.
    pub fn endpoint_name(&self) -> Option<&str> {
        self.endpoint_name.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Returns the runtime URL. Defaults to the regional SageMaker runtime host.
    pub fn runtime_url_or_default(&self) -> String {
        self.runtime_url.clone().unwrap_or_else(|| {
            format!(
                "https://runtime.sagemaker.{}.amazonaws.com",
                self.region.as_deref().unwrap_or(DEFAULT_REGION)
            )
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the data directory. Defaults to ./data.
    pub fn data_dir_or_default(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    /// Zero or unset disables the client-side timeout.
    pub fn invoke_timeout(&self) -> Option<Duration> {
        self.invoke_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
