//! Quota inspection and override endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::handlers::{error_response, ApiError, AppState};
use crate::error::AdminError;
use crate::quota::types::{DomainQuotaReport, SetQuotaRequest, UserQuotaReport};

/// GET /v1/users/:id/quota
///
/// Usage plus the effective limit and where it came from. 404 only
/// when the storage backend has no such account; an account with zero
/// mailboxes reports zeros.
pub async fn get_user_quota(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserQuotaReport>, (StatusCode, Json<ApiError>)> {
    let snapshot = state
        .usage
        .usage(&username)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(AdminError::NotFound(format!("account {}", username)))
        })?;

    let effective = state
        .resolver
        .effective_quota(&username)
        .await
        .map_err(error_response)?;

    Ok(Json(UserQuotaReport {
        username,
        used_bytes: snapshot.total_bytes,
        quota_bytes: effective.bytes,
        quota_source: effective.source,
        mailboxes: snapshot.mailboxes,
    }))
}

/// PUT /v1/users/:id/quota
pub async fn set_user_quota(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<SetQuotaRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    if req.quota_bytes < 0 {
        return Err(error_response(AdminError::InvalidArgument(format!(
            "quota_bytes must be >= 0, got {}",
            req.quota_bytes
        ))));
    }

    let exists = state
        .usage
        .usage(&username)
        .await
        .map_err(error_response)?
        .is_some();
    if !exists {
        return Err(error_response(AdminError::NotFound(format!(
            "account {}",
            username
        ))));
    }

    state
        .quota_store
        .set_user_quota(&username, req.quota_bytes)
        .await
        .map_err(error_response)?;

    info!("set quota override for {} to {} bytes", username, req.quota_bytes);
    Ok(StatusCode::OK)
}

/// GET /v1/domains/:domain/quota
pub async fn get_domain_quota(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<DomainQuotaReport>, (StatusCode, Json<ApiError>)> {
    let quota_bytes = state
        .quota_store
        .get_domain_quota(&domain)
        .await
        .map_err(error_response)?
        .unwrap_or(0);

    let mut users = state
        .usage
        .domain_usage(&domain)
        .await
        .map_err(error_response)?;

    for user in &mut users {
        user.quota_override = state
            .quota_store
            .get_user_quota(&user.username)
            .await
            .map_err(error_response)?
            .filter(|quota| *quota > 0);
    }

    let used_bytes = users.iter().map(|u| u.used_bytes).sum();

    Ok(Json(DomainQuotaReport {
        domain,
        used_bytes,
        quota_bytes,
        user_count: users.len() as i64,
        users,
    }))
}

/// PUT /v1/domains/:domain/quota
///
/// No existence check: a domain default may be staged before the
/// domain has any users.
pub async fn set_domain_quota(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
    Json(req): Json<SetQuotaRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    if req.quota_bytes < 0 {
        return Err(error_response(AdminError::InvalidArgument(format!(
            "quota_bytes must be >= 0, got {}",
            req.quota_bytes
        ))));
    }

    state
        .quota_store
        .set_domain_quota(&domain, req.quota_bytes)
        .await
        .map_err(error_response)?;

    info!("set default quota for {} to {} bytes", domain, req.quota_bytes);
    Ok(StatusCode::OK)
}
