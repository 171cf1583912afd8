pub mod admin;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod mottos;
pub mod qr_codes;
pub mod swagger;

use actix_web::web;

use crate::utils::error::AppError;

/// Registers every route and the extractor error handlers.
/// Middleware and shared state are added by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Extractor failures use the common error body
        .app_data(web::JsonConfig::default().error_handler(|err, req| {
            log::debug!("{} {} rejected body: {}", req.method(), req.path(), err);
            AppError::InvalidBody.into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, req| {
            log::debug!("{} {} rejected query: {}", req.method(), req.path(), err);
            AppError::InvalidBody.into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, req| {
            log::debug!("{} {} rejected path: {}", req.method(), req.path(), err);
            AppError::InvalidBody.into()
        }))
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Sign-in session
        .service(
            web::scope("/api/auth")
                .route("/session", web::post().to(auth::sign_in))
                .route("/session", web::delete().to(auth::sign_out))
                .route("/me", web::get().to(auth::get_me)),
        )
        // Mottos & likes
        .service(
            web::scope("/api/mottos")
                .route("", web::post().to(mottos::create_motto))
                .route("/mine", web::get().to(mottos::get_my_motto)) // before /{id}
                .route("/{id}", web::get().to(mottos::get_motto))
                .route("/{id}/like", web::post().to(mottos::like_motto))
                .route("/{id}/like", web::get().to(mottos::get_like_status)),
        )
        // Public page behind a printed label
        .route(
            "/api/profiles/qr/{code_id}",
            web::get().to(qr_codes::get_profile_by_code),
        )
        // Legacy label URL generator
        .service(
            web::resource("/api/qr-codes")
                .route(web::get().to(qr_codes::get_qr_code_url))
                .route(web::post().to(qr_codes::post_qr_code_url)),
        )
        // ==================== ADMIN (role claim = admin) ====================
        .service(
            web::scope("/api/admin")
                .route("/set-role", web::post().to(admin::set_role))
                .route("/qr-codes", web::get().to(qr_codes::list_qr_codes))
                .route("/qr-codes", web::post().to(qr_codes::create_qr_code))
                .route("/qr-codes/{code_id}", web::get().to(qr_codes::get_qr_code))
                .route("/qr-codes/{code_id}/link", web::post().to(qr_codes::link_qr_code)),
        );
}
