//! API client used by the dashboard.
//!
//! Every dashboard operation goes through a [`DataSource`]. The source is
//! picked once by [`connect`] (live backend or the built-in demo dataset) and
//! stays fixed for the lifetime of the session, so live and demo records are
//! never mixed.

use crate::config::ClientConfig;
use crate::models::{ApprovalResponse, ApproveRequest, CreateSurveyRequest, Survey, UpdateSurveyRequest, User};
use async_trait::async_trait;
use derive_more::Display;
use log::{info, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod auth;
pub mod demo;
pub mod live;

pub use auth::AuthContext;
pub use demo::DemoDataSource;
pub use live::LiveDataSource;

// How long the startup probe waits for the backend
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Display, Clone, PartialEq)]
pub enum ClientError {
    #[display(fmt = "network error: {}", _0)]
    Network(String),
    #[display(fmt = "not authenticated")]
    Unauthorized,
    #[display(fmt = "survey not found")]
    NotFound,
    #[display(fmt = "backend returned {}: {}", _0, _1)]
    Status(u16, String),
    #[display(fmt = "could not decode response: {}", _0)]
    Decode(String),
}

impl std::error::Error for ClientError {}

// Operations the dashboard performs against a backend
#[async_trait]
pub trait DataSource: Send + Sync {
    // Short name shown in the dashboard header
    fn name(&self) -> &'static str;

    async fn login(&self, google_token: &str) -> Result<User, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    async fn get_user(&self) -> Result<Option<User>, ClientError>;

    async fn get_all(&self, page: u32, limit: u32) -> Result<Vec<Survey>, ClientError>;
    async fn get_by_id(&self, id: &str) -> Result<Survey, ClientError>;
    async fn create(&self, request: &CreateSurveyRequest) -> Result<Survey, ClientError>;
    async fn update(&self, id: &str, request: &UpdateSurveyRequest) -> Result<Survey, ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
    async fn approve(&self, id: &str, request: &ApproveRequest) -> Result<ApprovalResponse, ClientError>;
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    #[display(fmt = "live")]
    Live,
    #[display(fmt = "demo")]
    Demo,
    #[display(fmt = "auto")]
    Auto,
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(DataSourceKind::Live),
            "demo" => Ok(DataSourceKind::Demo),
            "auto" => Ok(DataSourceKind::Auto),
            other => Err(format!("Unknown data source: {}", other)),
        }
    }
}

// Build the session's data source. `Auto` probes the backend once.
pub async fn connect(config: &ClientConfig) -> Result<Arc<dyn DataSource>, ClientError> {
    match config.data_source {
        DataSourceKind::Demo => {
            info!("Using demo data source");
            Ok(Arc::new(DemoDataSource::new()))
        }
        DataSourceKind::Live => {
            info!("Using live data source at {}", config.api_url);
            Ok(Arc::new(LiveDataSource::new(&config.api_url)?))
        }
        DataSourceKind::Auto => {
            let live = LiveDataSource::new(&config.api_url)?;
            match live.probe(PROBE_TIMEOUT).await {
                Ok(()) => {
                    info!("Backend reachable at {}, using live data source", config.api_url);
                    Ok(Arc::new(live))
                }
                Err(e) => {
                    warn!("Backend unavailable ({}), using demo data source", e);
                    Ok(Arc::new(DemoDataSource::new()))
                }
            }
        }
    }
}
