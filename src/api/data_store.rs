use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::api::response::success_response;
use crate::domain::data_store::available_fields;
use crate::domain::descriptor::source_descriptor;
use crate::domain::models::{FieldList, CONFIG_LDAP_ID, RESULT_FIELD};
use crate::error::{AppError, AppResult};
use crate::middleware::correlation_id;
use tracing::{debug, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    #[serde(rename = "ldapId")]
    pub ldap_id: String,
    #[serde(rename = "configuredAt")]
    pub configured_at: String,
}

#[derive(Debug, Serialize)]
pub struct TestConnectionResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveValuesRequest {
    /// Field names the host asked for. Accepted, not used for filtering.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub filter: Option<FieldList>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Describe the configuration and filter fields.
/// GET /api/data-store/descriptor
pub async fn get_descriptor() -> HttpResponse {
    success_response(source_descriptor())
}

/// Push the data store configuration.
/// PUT /api/data-store/configuration
pub async fn configure(
    req: HttpRequest,
    app_state: web::Data<crate::AppState>,
    body: web::Json<FieldList>,
) -> AppResult<HttpResponse> {
    let correlation_id = correlation_id(&req);

    let ldap_id = body
        .field_value(CONFIG_LDAP_ID)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation(format!("'{}' is required", CONFIG_LDAP_ID)))?
        .to_string();

    // Store the same id that is reported back
    let configuration = body.into_inner().with_field(CONFIG_LDAP_ID, ldap_id.clone());
    let (_, configured_at) = app_state.configure(&configuration)?;

    info!("[{}] Data store configured with LDAP ID {}", correlation_id, ldap_id);

    Ok(success_response(ConfigureResponse {
        ldap_id,
        configured_at: configured_at.to_rfc3339(),
    }))
}

/// Check whether the configured LDAP ID is usable.
/// GET /api/data-store/test-connection
pub async fn test_connection(
    req: HttpRequest,
    app_state: web::Data<crate::AppState>,
) -> AppResult<HttpResponse> {
    let correlation_id = correlation_id(&req);
    let store = app_state.current_store()?;

    let available = store.test_connection().await;
    debug!("[{}] Connection test: available={}", correlation_id, available);

    Ok(HttpResponse::Ok().json(TestConnectionResponse { available }))
}

/// List the fields this data store can fill.
/// GET /api/data-store/fields
pub async fn list_fields() -> HttpResponse {
    HttpResponse::Ok().json(available_fields())
}

/// Run the configured search and return the result map.
/// POST /api/data-store/values
///
/// The body is the raw map, `{}` on any failure.
pub async fn retrieve_values(
    req: HttpRequest,
    app_state: web::Data<crate::AppState>,
    body: web::Json<RetrieveValuesRequest>,
) -> AppResult<HttpResponse> {
    let correlation_id = correlation_id(&req);
    let store = app_state.current_store()?;

    let values = store.retrieve_values(&body.attributes, body.filter.as_ref()).await;
    debug!(
        "[{}] Retrieved {} values",
        correlation_id,
        values.get(RESULT_FIELD).map(|v| v.len()).unwrap_or(0)
    );

    Ok(HttpResponse::Ok().json(values))
}
