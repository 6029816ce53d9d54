// surveyforge-service/src/lib.rs
pub mod client;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod routes;
pub mod utils;
