// surveyforge-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

pub mod survey;
pub use survey::*;

pub mod user;
pub use user::*;

// Custom error types
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    InternalServerError,
    BadRequest(String),
    NotFound,
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::InternalServerError => write!(f, "Internal Server Error"),
            ServiceError::BadRequest(msg) => write!(f, "BadRequest: {}", msg),
            ServiceError::NotFound => write!(f, "Survey not found"),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

// Every error leaves the service as `{"error": "..."}`
impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError => {
                HttpResponse::InternalServerError().json(json!({ "error": "Internal Server Error" }))
            }
            ServiceError::BadRequest(ref message) => {
                HttpResponse::BadRequest().json(json!({ "error": message }))
            }
            ServiceError::NotFound => {
                HttpResponse::NotFound().json(json!({ "error": "Survey not found" }))
            }
        }
    }
}
