use actix_web::{HttpResponse, web};
use crate::error::AppResult;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct StatusResponse {
    service: String,
    version: String,
    status: String,
    uptime_seconds: u64,
    ldap_id: Option<String>,
    configured_at: Option<String>,
    test_connection_mode: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Status endpoint with detailed information.
/// GET /status
pub async fn status(app_state: web::Data<crate::AppState>) -> AppResult<HttpResponse> {
    let uptime = app_state.started_at.elapsed().as_secs();
    let (store, configured_at) = app_state.current()?;

    Ok(HttpResponse::Ok().json(StatusResponse {
        service: "ldap-data-store".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        uptime_seconds: uptime,
        ldap_id: store.endpoint_id().map(|id| id.to_string()),
        configured_at: configured_at.map(|t| t.to_rfc3339()),
        test_connection_mode: format!("{:?}", app_state.config.test_connection_mode).to_lowercase(),
    }))
}
