//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: status, first-time setup, login, and logout.
//! There is a single password for the whole instance; only its argon2 hash
//! is persisted, under the `password_hash` settings key.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::session;
use crate::web::state::AppState;
use nulis_core::ports::PortError;

/// Settings key the password hash is stored under.
pub const PASSWORD_HASH_KEY: &str = "password_hash";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuthStatusResponse {
    #[serde(rename = "hasPassword")]
    pub has_password: bool,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/auth/status - Report whether a password is configured and
/// whether the current request is authenticated.
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Current auth status", body = AuthStatusResponse)
    )
)]
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiFailure> {
    let has_password = state.store.get_setting(PASSWORD_HASH_KEY).await?.is_some();
    let is_authenticated = state.is_authenticated(&headers);

    Ok(Json(AuthStatusResponse {
        has_password,
        is_authenticated,
    }))
}

/// POST /api/auth/setup - Set the instance password. Write-once: fails once
/// a password exists. Issues a session immediately on success.
#[utoipa::path(
    post,
    path = "/api/auth/setup",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password stored, session issued", body = SuccessResponse),
        (status = 400, description = "Already set or password too short", body = ErrorBody)
    )
)]
pub async fn setup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    if state.store.get_setting(PASSWORD_HASH_KEY).await?.is_some() {
        return Err(ApiFailure::bad_request("Password already set"));
    }

    let password = req.password.unwrap_or_default();
    if password.len() < 4 {
        return Err(ApiFailure::bad_request(
            "Password must be at least 4 characters",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiFailure::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // The settings row is the write-once guard. A concurrent setup racing
    // past the check above loses here on the primary key.
    state
        .store
        .insert_setting(PASSWORD_HASH_KEY, &hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => ApiFailure::bad_request("Password already set"),
            other => other.into(),
        })?;

    let token = session::create_session(state.config.session_secret.as_bytes()).map_err(|e| {
        error!("Failed to sign session token: {:?}", e);
        ApiFailure::Internal("Failed to create session".to_string())
    })?;
    let cookie = session::session_cookie(&token, state.config.production);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse::ok()),
    ))
}

/// POST /api/auth/login - Verify the password and issue a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Login successful", body = SuccessResponse),
        (status = 400, description = "No password configured yet", body = ErrorBody),
        (status = 401, description = "Wrong password", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let stored_hash = state
        .store
        .get_setting(PASSWORD_HASH_KEY)
        .await?
        .ok_or_else(|| ApiFailure::bad_request("Password not set up yet"))?;

    let parsed_hash = PasswordHash::new(&stored_hash).map_err(|e| {
        error!("Failed to parse stored password hash: {:?}", e);
        ApiFailure::Internal("Authentication error".to_string())
    })?;

    let password = req.password.unwrap_or_default();
    let valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(ApiFailure::Unauthorized("Wrong password".to_string()));
    }

    let token = session::create_session(state.config.session_secret.as_bytes()).map_err(|e| {
        error!("Failed to sign session token: {:?}", e);
        ApiFailure::Internal("Failed to create session".to_string())
    })?;
    let cookie = session::session_cookie(&token, state.config.production);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse::ok()),
    ))
}

/// POST /api/auth/logout - Clear the session cookie. Unconditional: the
/// token is stateless, so there is nothing server-side to invalidate.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = SuccessResponse)
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = session::clear_session_cookie(state.config.production);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse::ok()),
    )
}
