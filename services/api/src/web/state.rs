//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session;
use axum::http::HeaderMap;
use nulis_core::ports::ArticleStore;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// True iff the request carries a session cookie whose signature and
    /// expiry validate. Verification failures degrade to "not
    /// authenticated", never to an error.
    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        session::verify_session(headers, self.config.session_secret.as_bytes())
    }
}
