//! services/api/src/web/links.rs
//!
//! Handlers for the directed links between articles. The ordered pair
//! (source, target) is unique and self-loops are rejected.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::articles::ModeQuery;
use crate::web::auth::SuccessResponse;
use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::state::AppState;
use nulis_core::domain::{ArticleLink, CanvasMode};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Wire representation of a link.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ArticleLink> for LinkBody {
    fn from(l: ArticleLink) -> Self {
        Self {
            id: l.id,
            source_id: l.source_id,
            target_id: l.target_id,
            created_at: l.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub source_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/links - List links, newest first. With a mode filter, both
/// endpoints must sit on the requested canvas.
#[utoipa::path(
    get,
    path = "/api/links",
    params(ModeQuery),
    responses(
        (status = 200, description = "All links", body = [LinkBody]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_links_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ModeQuery>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let mode = match query.mode {
        None => None,
        Some(s) => Some(
            CanvasMode::parse(&s).ok_or_else(|| ApiFailure::bad_request("Invalid mode"))?,
        ),
    };

    let links = state.store.list_links(mode).await?;
    let body: Vec<LinkBody> = links.into_iter().map(LinkBody::from).collect();
    Ok(Json(body))
}

/// POST /api/links - Create a directed link between two existing articles.
#[utoipa::path(
    post,
    path = "/api/links",
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link created", body = LinkBody),
        (status = 400, description = "Missing endpoint or self-link", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Unknown endpoint article", body = ErrorBody),
        (status = 409, description = "Ordered pair already linked", body = ErrorBody)
    )
)]
pub async fn create_link_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    let (source_id, target_id) = match (req.source_id, req.target_id) {
        (Some(s), Some(t)) => (s, t),
        _ => {
            return Err(ApiFailure::bad_request(
                "sourceId and targetId are required",
            ))
        }
    };

    if source_id == target_id {
        return Err(ApiFailure::bad_request("Cannot link an article to itself"));
    }

    let link = state.store.create_link(source_id, target_id).await?;
    Ok((StatusCode::CREATED, Json(LinkBody::from(link))))
}

/// DELETE /api/links/{id} - Delete one link by id.
#[utoipa::path(
    delete,
    path = "/api/links/{id}",
    params(("id" = Uuid, Path, description = "Link id")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such link", body = ErrorBody)
    )
)]
pub async fn delete_link_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    if !state.is_authenticated(&headers) {
        return Err(ApiFailure::unauthorized());
    }

    state.store.delete_link(id).await?;
    Ok(Json(SuccessResponse::ok()))
}
