use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, trace};
use ox_forms::OptionPolicy;
use ox_profile_api::client::DEFAULT_BASE_URL;
use ox_profile_api::RetryPolicy;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    NotFound,
    #[error("Error reading configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Error parsing configuration file: {0}")]
    ParseError(String),
    #[error("Unsupported configuration file format")]
    UnsupportedFormat,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProfileConfig {
    /// log4rs configuration file; `env_logger` is used when absent.
    #[serde(default)]
    pub log4rs_config: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    /// Profile schema file; the built-in schema is used when absent.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default)]
    pub option_policy: OptionPolicy,
    #[serde(default = "default_user_id_retries")]
    pub user_id_retries: u32,
    #[serde(default = "default_user_id_retry_delay_ms")]
    pub user_id_retry_delay_ms: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            log4rs_config: None,
            api: ApiConfig::default(),
            schema_path: None,
            session_path: default_session_path(),
            option_policy: OptionPolicy::default(),
            user_id_retries: default_user_id_retries(),
            user_id_retry_delay_ms: default_user_id_retry_delay_ms(),
        }
    }
}

impl ProfileConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.user_id_retries,
            base_delay: Duration::from_millis(self.user_id_retry_delay_ms),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".ox_profile_session.json")
}

fn default_user_id_retries() -> u32 {
    3
}

fn default_user_id_retry_delay_ms() -> u64 {
    100
}

pub fn load_config_from_path(path: &Path) -> Result<ProfileConfig, ConfigError> {
    debug!("Loading config from: {:?}", path);

    if !path.exists() {
        error!("Configuration file not found at {:?}", path);
        return Err(ConfigError::NotFound);
    }

    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    trace!("Content read from config file: \n{}", contents);

    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            debug!("Parsing as YAML");
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        Some("json") => {
            debug!("Parsing as JSON");
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        Some("toml") => {
            debug!("Parsing as TOML");
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        _ => {
            error!("Unsupported config file format: {:?}", path.extension());
            Err(ConfigError::UnsupportedFormat)
        }
    }
}
