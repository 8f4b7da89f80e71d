//! Shared API state, error payloads and the unauthenticated endpoints.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::backend::{CredentialStore, DkimManager};
use crate::error::AdminError;
use crate::provision::Provisioner;
use crate::quota::{QuotaResolver, QuotaStore, UsageAggregator};

/// Shared application state. Every collaborator comes in through its
/// interface; nothing here is a process-wide singleton.
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub dkim: Arc<dyn DkimManager>,
    pub quota_store: Arc<QuotaStore>,
    pub usage: UsageAggregator,
    pub resolver: QuotaResolver,
    pub provisioner: Provisioner,
    pub admin_user: String,
    pub admin_password: String,
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// Map the error taxonomy onto HTTP statuses. Client mistakes come
/// back 4xx, collaborator failures 502, everything else 500.
pub fn error_response(err: AdminError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AdminError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        AdminError::NotFound(_) => StatusCode::NOT_FOUND,
        AdminError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
        AdminError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("request failed: {}", err);
    }

    (status, Json(ApiError::new(&err.to_string())))
}

/// GET /health
pub async fn health() -> Json<&'static str> {
    Json("OK")
}

/// GET /version
pub async fn version() -> Json<&'static str> {
    Json(env!("CARGO_PKG_VERSION"))
}
