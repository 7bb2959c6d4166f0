//! crates/nulis_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Article, ArticleLink, ArticlePatch, CanvasMode, NewArticle};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port (Trait)
//=========================================================================================

/// Visibility filter for article listing. Unauthenticated callers only see
/// published articles; the mode filter selects one of the two canvases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleFilter {
    pub published_only: bool,
    pub mode: Option<CanvasMode>,
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    // --- Settings ---
    async fn get_setting(&self, key: &str) -> PortResult<Option<String>>;

    /// Writes a settings row. Fails with `Conflict` if the key already
    /// exists; settings are write-once.
    async fn insert_setting(&self, key: &str, value: &str) -> PortResult<()>;

    // --- Articles ---
    async fn list_articles(&self, filter: ArticleFilter) -> PortResult<Vec<Article>>;

    async fn get_article_by_slug(&self, slug: &str) -> PortResult<Article>;

    async fn slug_exists(&self, slug: &str) -> PortResult<bool>;

    /// Inserts a new article under the given slug. Fails with `Conflict`
    /// when the slug is already taken; the caller retries with the next
    /// slug candidate.
    async fn create_article(&self, input: &NewArticle, slug: &str) -> PortResult<Article>;

    async fn update_article(&self, slug: &str, patch: &ArticlePatch) -> PortResult<Article>;

    /// Deletes the article and every link that references it as source or
    /// target.
    async fn delete_article(&self, slug: &str) -> PortResult<()>;

    // --- Links ---
    async fn list_links(&self, mode: Option<CanvasMode>) -> PortResult<Vec<ArticleLink>>;

    async fn links_from(&self, source_id: Uuid) -> PortResult<Vec<ArticleLink>>;

    /// Inserts a directed link. Fails with `NotFound` when either endpoint
    /// does not exist and `Conflict` when the ordered pair is already
    /// linked.
    async fn create_link(&self, source_id: Uuid, target_id: Uuid) -> PortResult<ArticleLink>;

    async fn delete_link(&self, id: Uuid) -> PortResult<()>;
}
