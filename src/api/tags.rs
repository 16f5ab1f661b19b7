//! Tags API. Reads are public; creation is admin-only.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, map_unique_violation, validate_slug};
use crate::auth::{AdminOnly, RoleGuard};
use crate::db::{Database, Tag};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::revocation::RevocationStore;

#[derive(Clone)]
pub struct TagsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl_has_auth_backend!(TagsState);

pub fn router(state: TagsState) -> Router {
    Router::new()
        .route("/", get(list_tags))
        .route("/", post(create_tag))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateTagRequest {
    name: String,
    slug: String,
}

#[derive(Serialize)]
struct TagResponse {
    id: String,
    name: String,
    slug: String,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.uuid,
            name: t.name,
            slug: t.slug,
        }
    }
}

async fn list_tags(State(state): State<TagsState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.db.tags().list().await.db_err("Failed to list tags")?;

    let tags: Vec<TagResponse> = tags.into_iter().map(Into::into).collect();
    Ok(Json(super::envelope::success(tags)))
}

async fn create_tag(
    State(state): State<TagsState>,
    _guard: RoleGuard<AdminOnly>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.len() < 2 {
        return Err(ApiError::bad_request("Name must be at least 2 characters"));
    }
    if name.len() > 100 {
        return Err(ApiError::bad_request("Name is too long"));
    }
    validate_slug(&payload.slug)?;

    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .tags()
        .create(&uuid, name, &payload.slug)
        .await
        .map_err(|e| map_unique_violation(e, "Slug is already in use", "Failed to create tag"))?;

    let tag = state
        .db
        .tags()
        .get_by_slug(&payload.slug)
        .await
        .db_err("Failed to load created tag")?
        .ok_or_else(|| ApiError::internal("Failed to load created tag"))?;

    Ok((
        StatusCode::CREATED,
        Json(super::envelope::success_with_message(
            TagResponse::from(tag),
            "Tag created",
        )),
    ))
}
