//! HTTP boundary: router, request-identity middleware, and the response
//! envelope. All transport concerns live here; the core services never see
//! HTTP types.

pub mod handlers;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

use crate::models::UserRole;
use crate::security::TokenCodec;
use crate::services::{Authenticator, PasswordResetFlow};

/// Shared HTTP server state
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub reset_flow: Arc<PasswordResetFlow>,
    pub codec: TokenCodec,
}

/// Common response envelope: `{ok, data | error}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Identity extracted from a verified bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
    pub email: String,
}

/// Request-scoped identity. Always present in extensions after the identity
/// middleware has run; `None` means the request is unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(pub Option<CurrentUser>);

/// Build the HTTP router with all auth endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/google", post(handlers::google_auth))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/forgot-password", post(handlers::forgot_password))
        .route("/auth/reset-password", post(handlers::reset_password))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/logout-all", post(handlers::logout_all))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint (no auth required)
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Bearer-token middleware.
///
/// Missing or malformed headers simply yield an unauthenticated request
/// context; an invalid token is logged and likewise treated as
/// unauthenticated. The authorization decision belongs to route-level
/// requirements, not this layer.
async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = extract_identity(&state.codec, request.headers());
    request.extensions_mut().insert(RequestIdentity(identity));
    next.run(request).await
}

fn extract_identity(codec: &TokenCodec, headers: &HeaderMap) -> Option<CurrentUser> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    match codec.verify(token) {
        Ok(claims) => {
            let id = claims.user_id().ok()?;
            Some(CurrentUser {
                id,
                role: claims.role,
                email: claims.email,
            })
        }
        Err(_) => {
            debug!("Bearer token rejected; continuing unauthenticated");
            None
        }
    }
}
