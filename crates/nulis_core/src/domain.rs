//! crates/nulis_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Publication state of an article. Drafts are invisible to
/// unauthenticated readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            _ => None,
        }
    }
}

/// Which of the two independent canvases an article belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    Public,
    Private,
}

impl CanvasMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanvasMode::Public => "public",
            CanvasMode::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(CanvasMode::Public),
            "private" => Some(CanvasMode::Private),
            _ => None,
        }
    }
}

/// Represents one note on the canvas. The slug is the public lookup key
/// and is globally unique.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Serialized rich-text document. Opaque to the server.
    pub content: String,
    /// Rendered HTML cache of `content`. Opaque to the server.
    pub content_html: String,
    pub status: ArticleStatus,
    pub mode: CanvasMode,
    pub position_x: f64,
    pub position_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A directed link between two articles. `(source_id, target_id)` is
/// unique and self-loops are rejected before the store is reached.
#[derive(Debug, Clone)]
pub struct ArticleLink {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an article. The slug is derived server-side and is
/// not part of the input.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub position_x: f64,
    pub position_y: f64,
    pub mode: CanvasMode,
}

/// A partial update. Only fields that are `Some` are written; everything
/// else keeps its stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    /// New slug derived from a title change. Left `None` when the derived
    /// value would collide with another article.
    pub slug: Option<String>,
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub status: Option<ArticleStatus>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

impl ArticlePatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.content.is_none()
            && self.content_html.is_none()
            && self.status.is_none()
            && self.position_x.is_none()
            && self.position_y.is_none()
    }
}
