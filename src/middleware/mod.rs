use actix_web::HttpRequest;
use uuid::Uuid;

/// Header carrying the caller's correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Correlation id for log lines of one request.
/// Uses the caller's `x-correlation-id` when present, otherwise generates one.
pub fn correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
