/// Route handlers for the authentication API
use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::error::{AuthError, Result};
use crate::http::{ApiResponse, AppState, RequestIdentity};
use crate::models::user::{
    ForgotPasswordRequest, GoogleAuthRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest,
};
use crate::services::TokenPair;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<TokenPair>>> {
    req.validate()?;
    let tokens = state
        .authenticator
        .register(&req.email, &req.password)
        .await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>> {
    req.validate()?;
    let tokens = state.authenticator.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/google
pub async fn google_auth(
    State(state): State<AppState>,
    Json(req): Json<GoogleAuthRequest>,
) -> Result<Json<ApiResponse<TokenPair>>> {
    req.validate()?;
    let tokens = state.authenticator.login_with_google(&req.id_token).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>> {
    req.validate()?;
    let tokens = state.authenticator.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/forgot-password
///
/// Always answers with the same message, whether or not the email matches an
/// eligible account.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<String>>> {
    state.reset_flow.request_reset(&req.email).await?;
    Ok(Json(ApiResponse::success(
        "If the email exists, a password reset link has been sent.".to_string(),
    )))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<String>>> {
    req.validate()?;
    state
        .reset_flow
        .complete_reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::success(
        "Password has been reset successfully".to_string(),
    )))
}

/// POST /auth/logout
///
/// Succeeds whether or not the token existed, to avoid leaking which tokens
/// are valid.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<String>>> {
    req.validate()?;
    state.authenticator.logout(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(
        "Logged out successfully".to_string(),
    )))
}

/// POST /auth/logout-all
///
/// The only route requiring an authenticated caller.
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(RequestIdentity(identity)): Extension<RequestIdentity>,
) -> Result<Json<ApiResponse<String>>> {
    let user = identity.ok_or(AuthError::TokenInvalid)?;
    state.authenticator.logout_all(user.id).await?;
    Ok(Json(ApiResponse::success(
        "Logged out from all devices successfully".to_string(),
    )))
}
