//! Categories API. Reads are public; creation is admin-only.

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
use crate::db::{Category, Database};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::revocation::RevocationStore;

#[derive(Clone)]
pub struct CategoriesState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl_has_auth_backend!(CategoriesState);

pub fn router(state: CategoriesState) -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/", post(create_category))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateCategoryRequest {
    name: String,
    slug: String,
    description: Option<String>,
}

#[derive(Serialize)]
struct CategoryResponse {
    id: String,
    name: String,
    slug: String,
    description: Option<String>,
    post_count: i64,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.uuid,
            name: c.name,
            slug: c.slug,
            description: c.description,
            post_count: c.post_count,
        }
    }
}

async fn list_categories(
    State(state): State<CategoriesState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .db
        .categories()
        .list()
        .await
        .db_err("Failed to list categories")?;

    let categories: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
    Ok(Json(super::envelope::success(categories)))
}

async fn create_category(
    State(state): State<CategoriesState>,
    _guard: RoleGuard<AdminOnly>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.len() < 2 {
        return Err(ApiError::bad_request("Name must be at least 2 characters"));
    }
    if name.len() > 100 {
        return Err(ApiError::bad_request("Name is too long"));
    }
    validate_slug(&payload.slug)?;
    if let Some(description) = &payload.description {
        if description.len() > 500 {
            return Err(ApiError::bad_request("Description is too long"));
        }
    }

    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .categories()
        .create(&uuid, name, &payload.slug, payload.description.as_deref())
        .await
        .map_err(|e| {
            map_unique_violation(e, "Slug is already in use", "Failed to create category")
        })?;

    let category = state
        .db
        .categories()
        .get_by_slug(&payload.slug)
        .await
        .db_err("Failed to load created category")?
        .ok_or_else(|| ApiError::internal("Failed to load created category"))?;

    Ok((
        StatusCode::CREATED,
        Json(super::envelope::success_with_message(
            CategoryResponse::from(category),
            "Category created",
        )),
    ))
}
