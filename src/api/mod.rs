pub mod data_store;
pub mod health;
pub mod response;

use crate::error::AppError;
use actix_web::web;

/// Render JSON body errors in the same shape as other request errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("JSON error: {}", err)).into())
}

/// Configure all API routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Health endpoints
    cfg.route("/health", web::get().to(health::health_check))
        .route("/status", web::get().to(health::status));

    // Data store endpoints
    cfg.service(
        web::scope("/api/data-store")
            .app_data(json_config())
            .route("/descriptor", web::get().to(data_store::get_descriptor))
            .route("/configuration", web::put().to(data_store::configure))
            .route("/test-connection", web::get().to(data_store::test_connection))
            .route("/fields", web::get().to(data_store::list_fields))
            .route("/values", web::post().to(data_store::retrieve_values))
    );
}
