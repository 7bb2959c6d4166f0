//! services/api/src/web/pages.rs
//!
//! Serves the canvas page from the static assets directory. The login page
//! and everything else static come from the router's fallback `ServeDir`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::web::state::AppState;

/// GET /canvas - The protected canvas page. The route guard has already
/// validated the session by the time this runs.
pub async fn canvas_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let path = state.config.static_dir.join("canvas.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
