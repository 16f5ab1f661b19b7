mod auth;
mod categories;
pub mod envelope;
mod error;
mod posts;
mod tags;

use axum::{Router, middleware};
use std::sync::Arc;

use crate::db::Database;
use crate::guard::guard_request;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitStore;
use crate::revocation::RevocationStore;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    revocations: Arc<dyn RevocationStore>,
    rate_limiter: Arc<dyn RateLimitStore>,
) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
        revocations: revocations.clone(),
        rate_limiter,
    };

    let posts_state = posts::PostsState {
        db: db.clone(),
        jwt: jwt.clone(),
        revocations: revocations.clone(),
    };

    let categories_state = categories::CategoriesState {
        db: db.clone(),
        jwt: jwt.clone(),
        revocations: revocations.clone(),
    };

    let tags_state = tags::TagsState {
        db,
        jwt,
        revocations,
    };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/posts", posts::router(posts_state))
        .nest("/categories", categories::router(categories_state))
        .nest("/tags", tags::router(tags_state))
        .layer(middleware::from_fn(guard_request))
}
