//! services/api/src/web/mod.rs
//!
//! Web layer: handlers, session handling, router assembly, and the master
//! OpenAPI definition.

pub mod articles;
pub mod auth;
pub mod error;
pub mod links;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod state;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::warn;
use utoipa::OpenApi;

use state::AppState;

pub use middleware::require_canvas_session;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::status_handler,
        auth::setup_handler,
        auth::login_handler,
        auth::logout_handler,
        articles::list_articles_handler,
        articles::create_article_handler,
        articles::get_article_handler,
        articles::update_article_handler,
        articles::delete_article_handler,
        articles::sync_links_handler,
        links::list_links_handler,
        links::create_link_handler,
        links::delete_link_handler,
        upload::upload_handler,
    ),
    components(schemas(
        auth::PasswordRequest,
        auth::AuthStatusResponse,
        auth::SuccessResponse,
        articles::ArticleBody,
        articles::CreateArticleRequest,
        articles::UpdateArticleRequest,
        articles::SyncLinksRequest,
        articles::SyncLinksResponse,
        links::LinkBody,
        links::CreateLinkRequest,
        upload::UploadResponse,
        error::ErrorBody,
    )),
    tags(
        (name = "nulis API", description = "API endpoints for the canvas note-taking app.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the full application router. Factored out of the binary so
/// integration tests can drive the exact same routes.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/auth/status", get(auth::status_handler))
        .route("/api/auth/setup", post(auth::setup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route(
            "/api/articles",
            get(articles::list_articles_handler).post(articles::create_article_handler),
        )
        .route(
            "/api/articles/{slug}",
            get(articles::get_article_handler)
                .put(articles::update_article_handler)
                .delete(articles::delete_article_handler),
        )
        .route("/api/articles/{slug}/links", put(articles::sync_links_handler))
        .route(
            "/api/links",
            get(links::list_links_handler).post(links::create_link_handler),
        )
        .route("/api/links/{id}", delete(links::delete_link_handler))
        .route("/api/upload", post(upload::upload_handler));

    // The protected canvas page sits behind the session redirect guard.
    let page_routes = Router::new()
        .route("/canvas", get(pages::canvas_page))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_canvas_session,
        ));

    let mut app = Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    // Credentialed CORS for a separately-hosted frontend dev server.
    if let Some(origin) = &state.config.cors_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_credentials(true)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
                app = app.layer(cors);
            }
            Err(_) => warn!("Ignoring invalid CORS_ORIGIN value: {}", origin),
        }
    }

    app.with_state(state)
}
