// surveyforge-service/src/config.rs
use crate::client::DataSourceKind;
use derive_more::Display;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Display, PartialEq)]
pub enum ConfigError {
    #[display(fmt = "invalid value for {}: {:?}", name, value)]
    InvalidValue { name: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

// Where the service keeps surveys
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    Memory,
    JsonFile(PathBuf),
}

// Settings for the HTTP service binary
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub store: StoreKind,
    pub cors_origin: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("SURVEYFORGE_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StoreKind::Memory,
            Some(path) => StoreKind::JsonFile(PathBuf::from(path)),
        };

        Ok(Self {
            bind_address: lookup("SURVEYFORGE_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            store,
            cors_origin: lookup("SURVEYFORGE_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }
}

// Settings for the dashboard and its API client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub data_source: DataSourceKind,
    pub auth_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_source = match lookup("SURVEYFORGE_DATA_SOURCE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SURVEYFORGE_DATA_SOURCE",
                value: raw,
            })?,
            None => DataSourceKind::Auto,
        };

        let auth_timeout = match lookup("SURVEYFORGE_AUTH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "SURVEYFORGE_AUTH_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        };

        let api_url = lookup("NEXT_PUBLIC_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_url,
            data_source,
            auth_timeout,
        })
    }
}
