use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use thiserror::Error;

/// HTTP-facing error types.
#[derive(Debug)]
pub enum AppError {
    /// Bad request with message
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Validation error
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type) = match self {
            AppError::BadRequest(_) => (actix_web::http::StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Internal(_) => (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Validation(_) => (actix_web::http::StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_type,
            "message": self.to_string()
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Coarse failure class of a data store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Endpoint unknown, resolver unavailable, or no endpoint configured.
    Resolution,
    /// Authentication or network failure opening or closing a session.
    Connection,
    /// Malformed request, rejected search, or mid-stream failure.
    Search,
}

/// Errors raised inside the data store before they are collapsed at the
/// public boundary.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("no LDAP ID has been configured")]
    NotConfigured,

    #[error("filter field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("LDAP endpoint '{endpoint_id}' is not registered")]
    EndpointNotFound { endpoint_id: String },

    #[error("endpoint resolution failed: {message}")]
    Resolution { message: String },

    #[error("connection to {server_url} failed: {message}")]
    Connection { server_url: String, message: String },

    #[error("bind as '{principal}' rejected: invalid credentials")]
    InvalidCredentials { principal: String },

    #[error("search failed: {message}")]
    Search { message: String },

    #[error("closing LDAP session failed: {message}")]
    Close { message: String },

    #[error("{stage} panicked")]
    Panicked { stage: FailureKind },
}

impl DataStoreError {
    pub fn connection(server_url: impl Into<String>, message: impl fmt::Display) -> Self {
        DataStoreError::Connection {
            server_url: server_url.into(),
            message: message.to_string(),
        }
    }

    pub fn search(message: impl fmt::Display) -> Self {
        DataStoreError::Search {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DataStoreError::NotConfigured
            | DataStoreError::EndpointNotFound { .. }
            | DataStoreError::Resolution { .. } => FailureKind::Resolution,
            DataStoreError::Connection { .. }
            | DataStoreError::InvalidCredentials { .. }
            | DataStoreError::Close { .. } => FailureKind::Connection,
            DataStoreError::MissingField { .. } | DataStoreError::Search { .. } => FailureKind::Search,
            DataStoreError::Panicked { stage } => *stage,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Resolution => write!(f, "endpoint resolution"),
            FailureKind::Connection => write!(f, "directory connection"),
            FailureKind::Search => write!(f, "directory search"),
        }
    }
}

pub type DataStoreResult<T> = Result<T, DataStoreError>;
