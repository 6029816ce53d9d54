// Third-party dependencies
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::io;

use surveyforge_service::config::ServiceConfig;
use surveyforge_service::routes::{self, AppState};
use surveyforge_service::utils::open_repository;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServiceConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let surveys = open_repository(&config.store).map_err(|e| {
        error!("Could not open survey store: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    let state = web::Data::new(AppState::new(surveys));
    let cors_origin = config.cors_origin.clone();

    info!("Server started at {}", config.bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::init_routes)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
