mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{dev::Service as _, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, StoreKind};
use crate::database::DocumentStore;
use crate::services::role_service::UnconfiguredRoleAdmin;
use crate::state::AppState;

async fn build_store(config: &AppConfig) -> io::Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreKind::Memory => {
            log::warn!("⚠️  STORE=memory: data lives in this process only");
            Ok(Arc::new(database::MemoryStore::new()))
        }
        StoreKind::Mongo => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "DATABASE_URL must be set"))?;

            let db = database::MongoDB::new(url).await.map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("Failed to connect to MongoDB: {}", e))
            })?;
            log::info!("✅ MongoDB connected successfully");
            Ok(Arc::new(db))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    log::info!("🚀 Starting Motto Service...");
    log::info!("🗄️  Store: {:?}", config.store);

    let store = build_store(&config).await?;

    // Role changes need the identity provider's privileged API; none is wired in.
    let role_admin = Arc::new(UnconfiguredRoleAdmin);

    let host = config.host.clone();
    let port = config.port;
    let cors_origins = config.cors_origins.clone();
    let state = web::Data::new(AppState::new(store, config, role_admin));

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(middleware::AuthMiddleware)
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .wrap_fn(|req, srv| {
                api::metrics::increment_request_count();
                srv.call(req)
            })
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
