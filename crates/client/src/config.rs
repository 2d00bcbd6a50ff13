use std::path::PathBuf;

use thiserror::Error;

use shopkeep_observability::LogFormat;
use shopkeep_store::HttpStoreConfig;

pub const REMOTE_URL: &str = "SHOPKEEP_REMOTE_URL";
pub const REMOTE_KEY: &str = "SHOPKEEP_REMOTE_KEY";
pub const DATA_DIR: &str = "SHOPKEEP_DATA_DIR";
pub const EXPORT_DIR: &str = "SHOPKEEP_EXPORT_DIR";
pub const LOG_FORMAT: &str = "SHOPKEEP_LOG_FORMAT";

const DEFAULT_DATA_DIR: &str = "shopkeep-data";
const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set to use the remote database")]
    MissingRemote(&'static str),
    #[error("unknown log format {0:?} (expected json or pretty)")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub remote: RemoteSettings,
    /// Directory of the local JSON store.
    pub data_dir: PathBuf,
    /// Where exports, saved bills and migration backups are written.
    pub export_dir: PathBuf,
    pub log_format: LogFormat,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_format = match get(LOG_FORMAT) {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            remote: RemoteSettings {
                url: get(REMOTE_URL),
                api_key: get(REMOTE_KEY),
            },
            data_dir: get(DATA_DIR).map(PathBuf::from).unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
            export_dir: get(EXPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| DEFAULT_EXPORT_DIR.into()),
            log_format,
        })
    }

    /// HTTP store settings; only required when the remote database is used.
    pub fn http_store(&self) -> Result<HttpStoreConfig, ConfigError> {
        let base_url = self.remote.url.clone().ok_or(ConfigError::MissingRemote(REMOTE_URL))?;
        let api_key = self.remote.api_key.clone().ok_or(ConfigError::MissingRemote(REMOTE_KEY))?;
        Ok(HttpStoreConfig {
            base_url,
            api_key,
            access_token: None,
        })
    }
}
