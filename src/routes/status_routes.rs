// src/routes/status_routes.rs
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

// Liveness probe; the dashboard uses it to pick its data source
#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "Backend is running" }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index);
}
