//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ArticleStore` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nulis_core::domain::{
    Article, ArticleLink, ArticlePatch, ArticleStatus, CanvasMode, NewArticle,
};
use nulis_core::ports::{ArticleFilter, ArticleStore, PortError, PortResult};
use sqlx::{error::ErrorKind, FromRow, SqlitePool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ArticleStore` port.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new `SqliteStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn get_article_by_id(&self, id: Uuid) -> PortResult<Article> {
        let record = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, title, slug, content, content_html, status, mode, \
             position_x, position_y, created_at, updated_at \
             FROM articles WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Article {} not found", id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn article_exists(&self, id: Uuid) -> PortResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE id = ?1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(count > 0)
    }
}

/// Maps an insert failure to `Conflict` when it was caused by a unique
/// constraint, so callers can react (retry a slug, reject a duplicate link).
fn conflict_or_unexpected(e: sqlx::Error, conflict_msg: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::UniqueViolation) => {
            PortError::Conflict(conflict_msg.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ArticleRecord {
    id: String,
    title: String,
    slug: String,
    content: String,
    content_html: String,
    status: String,
    mode: String,
    position_x: f64,
    position_y: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ArticleRecord {
    fn to_domain(self) -> PortResult<Article> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| PortError::Unexpected(format!("Invalid article id in store: {}", e)))?;
        let status = ArticleStatus::parse(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("Invalid article status in store: {}", self.status))
        })?;
        let mode = CanvasMode::parse(&self.mode).ok_or_else(|| {
            PortError::Unexpected(format!("Invalid article mode in store: {}", self.mode))
        })?;
        Ok(Article {
            id,
            title: self.title,
            slug: self.slug,
            content: self.content,
            content_html: self.content_html,
            status,
            mode,
            position_x: self.position_x,
            position_y: self.position_y,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct LinkRecord {
    id: String,
    source_id: String,
    target_id: String,
    created_at: DateTime<Utc>,
}

impl LinkRecord {
    fn to_domain(self) -> PortResult<ArticleLink> {
        let parse = |field: &str, value: &str| {
            Uuid::parse_str(value).map_err(|e| {
                PortError::Unexpected(format!("Invalid link {} in store: {}", field, e))
            })
        };
        Ok(ArticleLink {
            id: parse("id", &self.id)?,
            source_id: parse("source_id", &self.source_id)?,
            target_id: parse("target_id", &self.target_id)?,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `ArticleStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn get_setting(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn insert_setting(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query("INSERT INTO settings (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_unexpected(e, &format!("Setting {} already exists", key)))?;
        Ok(())
    }

    async fn list_articles(&self, filter: ArticleFilter) -> PortResult<Vec<Article>> {
        let records = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, title, slug, content, content_html, status, mode, \
             position_x, position_y, created_at, updated_at \
             FROM articles \
             WHERE (?1 = 0 OR status = 'published') AND (?2 IS NULL OR mode = ?2) \
             ORDER BY created_at DESC",
        )
        .bind(filter.published_only)
        .bind(filter.mode.map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_article_by_slug(&self, slug: &str) -> PortResult<Article> {
        let record = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, title, slug, content, content_html, status, mode, \
             position_x, position_y, created_at, updated_at \
             FROM articles WHERE slug = ?1",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Article {} not found", slug))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn slug_exists(&self, slug: &str) -> PortResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE slug = ?1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(count > 0)
    }

    async fn create_article(&self, input: &NewArticle, slug: &str) -> PortResult<Article> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO articles \
             (id, title, slug, content, content_html, status, mode, \
              position_x, position_y, created_at, updated_at) \
             VALUES (?1, ?2, ?3, '', '', 'draft', ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(slug)
        .bind(input.mode.as_str())
        .bind(input.position_x)
        .bind(input.position_y)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, &format!("Slug {} already exists", slug)))?;

        Ok(Article {
            id,
            title: input.title.clone(),
            slug: slug.to_string(),
            content: String::new(),
            content_html: String::new(),
            status: ArticleStatus::Draft,
            mode: input.mode,
            position_x: input.position_x,
            position_y: input.position_y,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_article(&self, slug: &str, patch: &ArticlePatch) -> PortResult<Article> {
        let current = self.get_article_by_slug(slug).await?;
        let now = Utc::now();

        sqlx::query(
            "UPDATE articles SET title = ?1, slug = ?2, content = ?3, content_html = ?4, \
             status = ?5, position_x = ?6, position_y = ?7, updated_at = ?8 \
             WHERE id = ?9",
        )
        .bind(patch.title.as_deref().unwrap_or(&current.title))
        .bind(patch.slug.as_deref().unwrap_or(&current.slug))
        .bind(patch.content.as_deref().unwrap_or(&current.content))
        .bind(patch.content_html.as_deref().unwrap_or(&current.content_html))
        .bind(patch.status.unwrap_or(current.status).as_str())
        .bind(patch.position_x.unwrap_or(current.position_x))
        .bind(patch.position_y.unwrap_or(current.position_y))
        .bind(now)
        .bind(current.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_or_unexpected(e, &format!("Slug {:?} already exists", patch.slug))
        })?;

        self.get_article_by_id(current.id).await
    }

    async fn delete_article(&self, slug: &str) -> PortResult<()> {
        let article = self.get_article_by_slug(slug).await?;
        let id = article.id.to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM article_links WHERE source_id = ?1 OR target_id = ?1")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn list_links(&self, mode: Option<CanvasMode>) -> PortResult<Vec<ArticleLink>> {
        let records = match mode {
            None => {
                sqlx::query_as::<_, LinkRecord>(
                    "SELECT id, source_id, target_id, created_at FROM article_links \
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
            Some(mode) => {
                // Both endpoints must sit on the requested canvas.
                sqlx::query_as::<_, LinkRecord>(
                    "SELECT l.id, l.source_id, l.target_id, l.created_at \
                     FROM article_links l \
                     JOIN articles s ON s.id = l.source_id \
                     JOIN articles t ON t.id = l.target_id \
                     WHERE s.mode = ?1 AND t.mode = ?1 \
                     ORDER BY l.created_at DESC",
                )
                .bind(mode.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn links_from(&self, source_id: Uuid) -> PortResult<Vec<ArticleLink>> {
        let records = sqlx::query_as::<_, LinkRecord>(
            "SELECT id, source_id, target_id, created_at FROM article_links \
             WHERE source_id = ?1 ORDER BY created_at DESC",
        )
        .bind(source_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn create_link(&self, source_id: Uuid, target_id: Uuid) -> PortResult<ArticleLink> {
        if !self.article_exists(source_id).await? {
            return Err(PortError::NotFound(format!(
                "Article {} not found",
                source_id
            )));
        }
        if !self.article_exists(target_id).await? {
            return Err(PortError::NotFound(format!(
                "Article {} not found",
                target_id
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO article_links (id, source_id, target_id, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id.to_string())
        .bind(source_id.to_string())
        .bind(target_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "Link already exists"))?;

        Ok(ArticleLink {
            id,
            source_id,
            target_id,
            created_at: now,
        })
    }

    async fn delete_link(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM article_links WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Link {} not found", id)));
        }
        Ok(())
    }
}
