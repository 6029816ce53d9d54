// src/routes/mod.rs
use crate::models::ServiceError;
use crate::utils::SurveyRepository;
use actix_web::web;
use std::sync::Arc;

pub mod status_routes;
pub mod survey_routes;

// Shared handler state; the store is injected at startup
#[derive(Clone)]
pub struct AppState {
    pub surveys: Arc<dyn SurveyRepository>,
}

impl AppState {
    pub fn new(surveys: Arc<dyn SurveyRepository>) -> Self {
        Self { surveys }
    }
}

// Malformed bodies and query strings become `{"error": ...}` 400s
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServiceError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ServiceError::BadRequest(err.to_string()).into())
}

// Register every route plus extractor configuration
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .configure(status_routes::init_routes)
        .configure(survey_routes::init_routes);
}
