//! services/api/src/web/articles.rs
//!
//! CRUD handlers for articles. Slugs are the public lookup key: derived
//! from the title on create (with `-1`, `-2`, ... suffixes until the
//! store's unique constraint accepts the insert) and re-derived on title
//! change, silently keeping the old slug when the new one is taken.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::auth::SuccessResponse;
use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::links::LinkBody;
use crate::web::state::AppState;
use nulis_core::domain::{Article, ArticlePatch, ArticleStatus, CanvasMode, NewArticle};
use nulis_core::ports::{ArticleFilter, PortError};
use nulis_core::{reconcile, slug};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Wire representation of an article.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub status: String,
    pub mode: String,
    pub position_x: f64,
    pub position_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleBody {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            content: a.content,
            content_html: a.content_html,
            status: a.status.as_str().to_string(),
            mode: a.mode.as_str().to_string(),
            position_x: a.position_x,
            position_y: a.position_y,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub mode: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub status: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

#[derive(Deserialize, IntoParams)]
pub struct ModeQuery {
    /// Restrict to one canvas: `public` or `private`.
    pub mode: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLinksRequest {
    pub target_ids: Vec<Uuid>,
}

/// Result of reconciling an article's outgoing links on save.
#[derive(Serialize, ToSchema)]
pub struct SyncLinksResponse {
    /// Links created because their target entered the desired set.
    pub added: Vec<LinkBody>,
    /// Ids of links deleted because their target left the desired set.
    pub removed: Vec<Uuid>,
}

fn parse_mode(raw: Option<String>) -> Result<Option<CanvasMode>, ApiFailure> {
    match raw {
        None => Ok(None),
        Some(s) => CanvasMode::parse(&s)
            .map(Some)
            .ok_or_else(|| ApiFailure::bad_request("Invalid mode")),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/articles - List articles, newest first. Unauthenticated
/// callers only see published ones.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ModeQuery),
    responses(
        (status = 200, description = "Articles visible to the caller", body = [ArticleBody])
    )
)]
pub async fn list_articles_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ModeQuery>,
) -> Result<impl IntoResponse, ApiFailure> {
    let is_auth = state.is_authenticated(&headers);
    let filter = ArticleFilter {
        published_only: !is_auth,
        mode: parse_mode(query.mode)?,
    };

    let articles = state.store.list_articles(filter).await?;
    let body: Vec<ArticleBody> = articles.into_iter().map(ArticleBody::from).collect();
    Ok(Json(body))
}

/// POST /api/articles - Create an article at the given canvas position.
/// New articles start as drafts.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn create_article_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let title = match req.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => "Untitled".to_string(),
    };
    let mode = parse_mode(req.mode)?.unwrap_or(CanvasMode::Public);

    let input = NewArticle {
        title,
        position_x: req.position_x.unwrap_or(0.0),
        position_y: req.position_y.unwrap_or(0.0),
        mode,
    };

    // The unique constraint is the arbiter: walk candidates until an
    // insert goes through.
    let base = slug::slugify(&input.title);
    let mut created = None;
    for candidate in slug::candidates(&base) {
        match state.store.create_article(&input, &candidate).await {
            Ok(article) => {
                created = Some(article);
                break;
            }
            Err(PortError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let article =
        created.ok_or_else(|| ApiFailure::Internal("Slug candidates exhausted".to_string()))?;

    Ok((StatusCode::CREATED, Json(ArticleBody::from(article))))
}

/// GET /api/articles/{slug} - Fetch one article. Unpublished articles are
/// reported as missing to unauthenticated callers so their existence does
/// not leak.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "The article", body = ArticleBody),
        (status = 404, description = "Missing, or hidden from the caller", body = ErrorBody)
    )
)]
pub async fn get_article_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiFailure> {
    let article = state.store.get_article_by_slug(&slug).await?;

    if !state.is_authenticated(&headers) && article.status != ArticleStatus::Published {
        return Err(ApiFailure::not_found());
    }

    Ok(Json(ArticleBody::from(article)))
}

/// PUT /api/articles/{slug} - Partial update. Only fields present in the
/// request change; a title change re-derives the slug but keeps the old
/// one if the new value is taken.
#[utoipa::path(
    put,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated article", body = ArticleBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such article", body = ErrorBody)
    )
)]
pub async fn update_article_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let current = state.store.get_article_by_slug(&slug).await?;

    let status = match req.status {
        None => None,
        Some(s) => Some(
            ArticleStatus::parse(&s).ok_or_else(|| ApiFailure::bad_request("Invalid status"))?,
        ),
    };

    let mut patch = ArticlePatch {
        title: req.title.clone(),
        slug: None,
        content: req.content,
        content_html: req.content_html,
        status,
        position_x: req.position_x,
        position_y: req.position_y,
    };

    if let Some(title) = &req.title {
        let new_slug = slug::slugify(title);
        if new_slug != current.slug && !state.store.slug_exists(&new_slug).await? {
            patch.slug = Some(new_slug);
        }
    }

    let updated = match state.store.update_article(&slug, &patch).await {
        // Lost the slug to a concurrent write between the check and the
        // update: keep the old slug, as for any other collision.
        Err(PortError::Conflict(_)) if patch.slug.is_some() => {
            patch.slug = None;
            state.store.update_article(&slug, &patch).await?
        }
        other => other?,
    };

    Ok(Json(ArticleBody::from(updated)))
}

/// DELETE /api/articles/{slug} - Delete an article and every link that
/// references it.
#[utoipa::path(
    delete,
    path = "/api/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such article", body = ErrorBody)
    )
)]
pub async fn delete_article_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    state.store.delete_article(&slug).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/articles/{slug}/links - Reconcile the article's outgoing links
/// against the desired target set: create the missing ones, delete the
/// dropped ones. The editor calls this on save.
#[utoipa::path(
    put,
    path = "/api/articles/{slug}/links",
    params(("slug" = String, Path, description = "Article slug")),
    request_body = SyncLinksRequest,
    responses(
        (status = 200, description = "Links reconciled", body = SyncLinksResponse),
        (status = 400, description = "Self-link in the target set", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such article or target", body = ErrorBody)
    )
)]
pub async fn sync_links_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(req): Json<SyncLinksRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let article = state.store.get_article_by_slug(&slug).await?;

    let desired: HashSet<Uuid> = req.target_ids.into_iter().collect();
    if desired.contains(&article.id) {
        return Err(ApiFailure::bad_request("Cannot link an article to itself"));
    }

    // The diff baseline is the currently stored outgoing set.
    let existing = state.store.links_from(article.id).await?;
    let current: HashSet<Uuid> = existing.iter().map(|l| l.target_id).collect();
    let by_target: HashMap<Uuid, Uuid> = existing.iter().map(|l| (l.target_id, l.id)).collect();

    let diff = reconcile(&current, &desired);

    let mut added = Vec::with_capacity(diff.to_add.len());
    for target_id in diff.to_add {
        let link = state.store.create_link(article.id, target_id).await?;
        added.push(LinkBody::from(link));
    }

    let mut removed = Vec::with_capacity(diff.to_remove.len());
    for target_id in diff.to_remove {
        if let Some(&link_id) = by_target.get(&target_id) {
            state.store.delete_link(link_id).await?;
            removed.push(link_id);
        }
    }

    Ok(Json(SyncLinksResponse { added, removed }))
}
