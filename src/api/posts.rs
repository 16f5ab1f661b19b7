//! Posts API.
//!
//! Reads are public (drafts stay hidden from non-staff callers); writes
//! require the editor or admin role, and edits are limited to the author or
//! an admin.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, map_unique_violation, validate_slug};
use crate::auth::{Auth, AuthenticatedUser, OptionalAuth, RoleGuard, Staff};
use crate::db::{Database, Post, PostStatus, PostSummary, Tag};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::revocation::RevocationStore;

#[derive(Clone)]
pub struct PostsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl_has_auth_backend!(PostsState);

pub fn router(state: PostsState) -> Router {
    Router::new()
        .route("/", get(list_posts))
        .route("/", post(create_post))
        .route("/{slug}", get(get_post))
        .route("/{slug}", put(update_post))
        .route("/{slug}", delete(delete_post))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct CreatePostRequest {
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    category: Option<String>,
    #[serde(default)]
    featured: bool,
    status: PostStatus,
    #[serde(default)]
    tags: Vec<String>,
    reading_time: Option<i64>,
}

#[derive(Deserialize)]
struct UpdatePostRequest {
    title: String,
    excerpt: String,
    content: String,
    category: Option<String>,
    #[serde(default)]
    featured: bool,
    status: PostStatus,
    tags: Option<Vec<String>>,
    reading_time: Option<i64>,
}

#[derive(Serialize)]
struct AuthorResponse {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct TagResponse {
    name: String,
    slug: String,
}

#[derive(Serialize)]
struct PostResponse {
    id: String,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    author: AuthorResponse,
    category: Option<String>,
    featured: bool,
    status: PostStatus,
    reading_time: Option<i64>,
    tags: Vec<TagResponse>,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize)]
struct PostSummaryResponse {
    id: String,
    title: String,
    slug: String,
    excerpt: String,
    author_name: String,
    category: Option<String>,
    featured: bool,
    status: PostStatus,
    reading_time: Option<i64>,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PostResponse {
    fn from_post(post: Post, tags: Vec<Tag>) -> Self {
        Self {
            id: post.uuid,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            author: AuthorResponse {
                id: post.author_uuid,
                name: post.author_name,
            },
            category: post.category_slug,
            featured: post.featured,
            status: post.status,
            reading_time: post.reading_time,
            tags: tags
                .into_iter()
                .map(|t| TagResponse {
                    name: t.name,
                    slug: t.slug,
                })
                .collect(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(p: PostSummary) -> Self {
        Self {
            id: p.uuid,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            author_name: p.author_name,
            category: p.category_slug,
            featured: p.featured,
            status: p.status,
            reading_time: p.reading_time,
            published_at: p.published_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// --- Handlers ---

async fn list_posts(
    State(state): State<PostsState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, ApiError> {
    let include_drafts = user.is_some_and(|u| u.claims.role.is_staff());

    let posts = state
        .db
        .posts()
        .list(include_drafts)
        .await
        .db_err("Failed to list posts")?;

    let posts: Vec<PostSummaryResponse> = posts.into_iter().map(Into::into).collect();
    Ok(Json(super::envelope::success(posts)))
}

async fn get_post(
    State(state): State<PostsState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .posts()
        .get_by_slug(&slug)
        .await
        .db_err("Failed to get post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    // Drafts are visible to staff and to their author; a hidden draft is
    // indistinguishable from a missing post.
    if post.status == PostStatus::Draft && !can_view_draft(&user, &post) {
        return Err(ApiError::not_found("Post not found"));
    }

    let tags = state
        .db
        .posts()
        .tags_for_post(post.id)
        .await
        .db_err("Failed to load post tags")?;

    Ok(Json(super::envelope::success(PostResponse::from_post(
        post, tags,
    ))))
}

async fn create_post(
    State(state): State<PostsState>,
    guard: RoleGuard<Staff>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_post_fields(&payload.title, &payload.excerpt, &payload.content)?;
    validate_slug(&payload.slug)?;
    validate_reading_time(payload.reading_time)?;

    let category_id = resolve_category(&state.db, payload.category.as_deref()).await?;
    let tag_ids = resolve_tags(&state.db, &payload.tags).await?;

    let author = state
        .db
        .users()
        .get_by_uuid(&guard.user.claims.sub)
        .await
        .db_err("Failed to look up author")?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let uuid = uuid::Uuid::new_v4().to_string();

    let post_id = state
        .db
        .posts()
        .create(
            &uuid,
            payload.title.trim(),
            &payload.slug,
            payload.excerpt.trim(),
            &payload.content,
            author.id,
            category_id,
            payload.featured,
            payload.status,
            payload.reading_time,
        )
        .await
        .map_err(|e| map_unique_violation(e, "Slug is already in use", "Failed to create post"))?;

    state
        .db
        .posts()
        .set_tags(post_id, &tag_ids)
        .await
        .db_err("Failed to attach tags")?;

    let post = state
        .db
        .posts()
        .get_by_slug(&payload.slug)
        .await
        .db_err("Failed to load created post")?
        .ok_or_else(|| ApiError::internal("Failed to load created post"))?;
    let tags = state
        .db
        .posts()
        .tags_for_post(post.id)
        .await
        .db_err("Failed to load post tags")?;

    Ok((
        StatusCode::CREATED,
        Json(super::envelope::success_with_message(
            PostResponse::from_post(post, tags),
            "Post created",
        )),
    ))
}

async fn update_post(
    State(state): State<PostsState>,
    Auth(user): Auth,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .posts()
        .get_by_slug(&slug)
        .await
        .db_err("Failed to get post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    require_post_ownership(&user, &post)?;

    validate_post_fields(&payload.title, &payload.excerpt, &payload.content)?;
    validate_reading_time(payload.reading_time)?;

    let category_id = resolve_category(&state.db, payload.category.as_deref()).await?;

    state
        .db
        .posts()
        .update(
            post.id,
            payload.title.trim(),
            payload.excerpt.trim(),
            &payload.content,
            category_id,
            payload.featured,
            payload.status,
            payload.reading_time,
        )
        .await
        .db_err("Failed to update post")?;

    if let Some(tags) = &payload.tags {
        let tag_ids = resolve_tags(&state.db, tags).await?;
        state
            .db
            .posts()
            .set_tags(post.id, &tag_ids)
            .await
            .db_err("Failed to attach tags")?;
    }

    let post = state
        .db
        .posts()
        .get_by_slug(&slug)
        .await
        .db_err("Failed to load updated post")?
        .ok_or_else(|| ApiError::internal("Failed to load updated post"))?;
    let tags = state
        .db
        .posts()
        .tags_for_post(post.id)
        .await
        .db_err("Failed to load post tags")?;

    Ok(Json(super::envelope::success_with_message(
        PostResponse::from_post(post, tags),
        "Post updated",
    )))
}

async fn delete_post(
    State(state): State<PostsState>,
    Auth(user): Auth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .posts()
        .get_by_slug(&slug)
        .await
        .db_err("Failed to get post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    require_post_ownership(&user, &post)?;

    state
        .db
        .posts()
        .delete(post.id)
        .await
        .db_err("Failed to delete post")?;

    Ok(Json(super::envelope::success_with_message(
        serde_json::json!(null),
        "Post deleted",
    )))
}

// --- Helpers ---

fn can_view_draft(user: &Option<AuthenticatedUser>, post: &Post) -> bool {
    user.as_ref()
        .is_some_and(|u| u.claims.role.is_staff() || u.claims.sub == post.author_uuid)
}

/// Writes are restricted to the post's author or an admin.
fn require_post_ownership(user: &AuthenticatedUser, post: &Post) -> Result<(), ApiError> {
    let is_author = user.claims.sub == post.author_uuid;
    let is_admin = user.claims.role == crate::db::UserRole::Admin;

    if !is_author && !is_admin {
        return Err(ApiError::forbidden("You can only modify your own posts"));
    }
    Ok(())
}

fn validate_post_fields(title: &str, excerpt: &str, content: &str) -> Result<(), ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > 255 {
        return Err(ApiError::bad_request("Title is too long"));
    }
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return Err(ApiError::bad_request("Excerpt cannot be empty"));
    }
    if excerpt.len() > 500 {
        return Err(ApiError::bad_request("Excerpt is too long"));
    }
    if content.is_empty() {
        return Err(ApiError::bad_request("Content cannot be empty"));
    }
    Ok(())
}

fn validate_reading_time(reading_time: Option<i64>) -> Result<(), ApiError> {
    if let Some(minutes) = reading_time {
        if !(1..=120).contains(&minutes) {
            return Err(ApiError::bad_request(
                "Reading time must be between 1 and 120 minutes",
            ));
        }
    }
    Ok(())
}

async fn resolve_category(
    db: &Database,
    category: Option<&str>,
) -> Result<Option<i64>, ApiError> {
    match category {
        None => Ok(None),
        Some(slug) => {
            let category = db
                .categories()
                .get_by_slug(slug)
                .await
                .db_err("Failed to look up category")?
                .ok_or_else(|| ApiError::bad_request("Unknown category"))?;
            Ok(Some(category.id))
        }
    }
}

async fn resolve_tags(db: &Database, slugs: &[String]) -> Result<Vec<i64>, ApiError> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let tag = db
            .tags()
            .get_by_slug(slug)
            .await
            .db_err("Failed to look up tag")?
            .ok_or_else(|| ApiError::bad_request("Unknown tag"))?;
        ids.push(tag.id);
    }
    Ok(ids)
}
