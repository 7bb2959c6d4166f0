//! services/api/src/web/middleware.rs
//!
//! Route guard for the protected canvas page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::web::session;
use crate::web::state::AppState;

/// Middleware that redirects requests without a valid session token back
/// to the login page. Coarser than the API-level check: only token
/// presence, signature, and expiry are inspected.
pub async fn require_canvas_session(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !session::verify_session(req.headers(), state.config.session_secret.as_bytes()) {
        return Redirect::to("/").into_response();
    }

    next.run(req).await
}
