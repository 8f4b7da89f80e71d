//! Admin API server: router assembly and the Basic-auth gate.

use axum::{
    extract::{Request, State},
    http::{
        header::{HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE},
        StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers::{self, ApiError, AppState};
use super::{quotas, users};
use crate::error::Result;

pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, addr: String) -> Self {
        Self {
            state: Arc::new(state),
            addr,
        }
    }

    /// Build the router. `/health` and `/version` are open; everything
    /// under `/v1` requires the admin credentials.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let public_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/version", get(handlers::version));

        let v1_routes = Router::new()
            .route("/users", post(users::create_user).get(users::list_users))
            .route(
                "/users/:id",
                get(users::get_user).delete(users::delete_user),
            )
            .route("/users/:id/password", post(users::update_password))
            .route(
                "/users/:id/mailboxes",
                post(users::create_mailboxes).delete(users::delete_mailboxes),
            )
            .route(
                "/users/:id/quota",
                get(quotas::get_user_quota).put(quotas::set_user_quota),
            )
            .route(
                "/domains/:domain/quota",
                get(quotas::get_domain_quota).put(quotas::set_domain_quota),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                admin_auth_middleware,
            ))
            .with_state(self.state.clone());

        Router::new()
            .merge(public_routes)
            .nest("/v1", v1_routes)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub async fn run(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("admin API listening on {}", self.addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Gate every /v1 request on the configured admin credentials.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|header| check_basic(header, &state.admin_user, &state.admin_password))
        .unwrap_or(false);

    if !authorized {
        let mut response =
            (StatusCode::UNAUTHORIZED, Json(ApiError::new("unauthorized"))).into_response();
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"mailadm\""),
        );
        return response;
    }

    next.run(request).await
}

fn check_basic(header: &str, user: &str, password: &str) -> bool {
    let Some(encoded) = header.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim()) else {
        return false;
    };
    let Ok(text) = String::from_utf8(decoded) else {
        return false;
    };
    match text.split_once(':') {
        Some((u, p)) => u == user && p == password,
        None => false,
    }
}
