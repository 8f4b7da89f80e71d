//! User and mailbox management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::handlers::{error_response, ApiError, AppState};
use crate::provision::ProvisionReport;
use crate::utils::address::split_address;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub create_mailboxes: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision: Option<ProvisionReport>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserParams {
    pub delete_mailbox: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// POST /v1/users
///
/// Creates credentials, adds a DKIM key when this is the first user of
/// its domain, and optionally provisions the mailbox set. The folder
/// outcomes are returned so partial provisioning is visible to the
/// operator.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), (StatusCode, Json<ApiError>)> {
    let (_, domain) = split_address(&req.username).map_err(error_response)?;

    let users = state.credentials.list_users().await.map_err(error_response)?;
    let suffix = format!("@{}", domain);
    let first_of_domain = !users.iter().any(|u| u.ends_with(&suffix));

    state
        .credentials
        .create_user(&req.username, &req.password)
        .await
        .map_err(error_response)?;

    if first_of_domain {
        state.dkim.add_key(domain).await.map_err(error_response)?;
    }

    let provision = if req.create_mailboxes {
        Some(
            state
                .provisioner
                .provision(&req.username)
                .await
                .map_err(error_response)?,
        )
    } else {
        None
    };

    info!("created user {}", req.username);
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            username: req.username,
            provision,
        }),
    ))
}

/// GET /v1/users[?domain=example.com]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ApiError>)> {
    let mut users = state.credentials.list_users().await.map_err(error_response)?;

    if let Some(domain) = params.domain {
        let suffix = format!("@{}", domain);
        users.retain(|u| u.ends_with(&suffix));
    }

    Ok(Json(users))
}

/// GET /v1/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, (StatusCode, Json<ApiError>)> {
    let users = state.credentials.list_users().await.map_err(error_response)?;

    if users.contains(&username) {
        Ok(Json(UserResponse { username }))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new("user not found")),
        ))
    }
}

/// DELETE /v1/users/:id[?delete_mailbox=true]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(params): Query<DeleteUserParams>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    state
        .credentials
        .delete_user(&username)
        .await
        .map_err(error_response)?;

    if params.delete_mailbox.unwrap_or(false) {
        state
            .provisioner
            .deprovision(&username)
            .await
            .map_err(error_response)?;
    }

    info!("deleted user {}", username);
    Ok(StatusCode::OK)
}

/// POST /v1/users/:id/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<PasswordRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    state
        .credentials
        .set_password(&username, &req.password)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::OK)
}

/// POST /v1/users/:id/mailboxes
pub async fn create_mailboxes(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<(StatusCode, Json<ProvisionReport>), (StatusCode, Json<ApiError>)> {
    let report = state
        .provisioner
        .provision(&username)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// DELETE /v1/users/:id/mailboxes
pub async fn delete_mailboxes(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    state
        .provisioner
        .deprovision(&username)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::OK)
}
