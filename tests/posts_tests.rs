//! Tests for the posts, categories, and tags APIs, and the role gating
//! that protects their write paths.

mod common;

use axum::http::StatusCode;
use common::{TestApp, body_json, setup};
use serde_json::json;

async fn create_published_post(t: &TestApp, token: &str, slug: &str) -> serde_json::Value {
    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Hello World",
                "slug": slug,
                "excerpt": "An introduction",
                "content": "Full body text",
                "status": "published",
            })),
            Some(token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_editor_creates_post() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;

    let body = create_published_post(&t, &token, "hello-world").await;
    assert_eq!(body["data"]["slug"], "hello-world");
    assert_eq!(body["data"]["status"], "published");
    assert_eq!(body["data"]["author"]["name"], "Staff User");
    assert!(body["data"]["published_at"].as_str().is_some());
}

#[tokio::test]
async fn test_regular_user_cannot_create_post() {
    let t = setup().await;
    let token = t.register_token("user@b.com", "Abcdef12", "A user", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Nope",
                "slug": "nope",
                "excerpt": "Nope",
                "content": "Nope",
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;

    // Valid identity, wrong role: 403, not 401
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Permission denied");
}

#[tokio::test]
async fn test_anonymous_cannot_create_post() {
    let t = setup().await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Nope",
                "slug": "nope",
                "excerpt": "Nope",
                "content": "Nope",
                "status": "draft",
            })),
            None,
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_can_read_published_posts() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;
    create_published_post(&t, &token, "hello-world").await;

    let response = t.json_request("GET", "/api/posts", None, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = t
        .json_request("GET", "/api/posts/hello-world", None, None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["content"], "Full body text");
}

#[tokio::test]
async fn test_drafts_hidden_from_public() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Draft",
                "slug": "draft-post",
                "excerpt": "WIP",
                "content": "Not ready",
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Anonymous list omits the draft, and a direct fetch 404s
    let response = t.json_request("GET", "/api/posts", None, None, None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let response = t
        .json_request("GET", "/api/posts/draft-post", None, None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The author still sees it
    let response = t
        .json_request("GET", "/api/posts/draft-post", None, Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;
    create_published_post(&t, &token, "hello-world").await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Hello Again",
                "slug": "hello-world",
                "excerpt": "Different",
                "content": "Different",
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_author_can_update_admin_can_delete() {
    let t = setup().await;
    let editor = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;
    let admin = t.staff_token("admin@b.com", "admin", "10.0.0.2").await;
    create_published_post(&t, &editor, "hello-world").await;

    let response = t
        .json_request(
            "PUT",
            "/api/posts/hello-world",
            Some(json!({
                "title": "Hello World, Revised",
                "excerpt": "An introduction",
                "content": "Edited body",
                "status": "published",
            })),
            Some(&editor),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Hello World, Revised");

    let response = t
        .json_request("DELETE", "/api/posts/hello-world", None, Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = t
        .json_request("GET", "/api/posts/hello-world", None, None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_editor_cannot_modify_post() {
    let t = setup().await;
    let author = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;
    let rival = t.staff_token("rival@b.com", "editor", "10.0.0.2").await;
    create_published_post(&t, &author, "hello-world").await;

    let response = t
        .json_request(
            "PUT",
            "/api/posts/hello-world",
            Some(json!({
                "title": "Hijacked",
                "excerpt": "x",
                "content": "x",
                "status": "published",
            })),
            Some(&rival),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t
        .json_request("DELETE", "/api/posts/hello-world", None, Some(&rival), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_with_category_and_tags() {
    let t = setup().await;
    let admin = t.staff_token("admin@b.com", "admin", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/categories",
            Some(json!({"name": "Engineering", "slug": "engineering"})),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for (name, slug) in [("Rust", "rust"), ("Web", "web")] {
        let response = t
            .json_request(
                "POST",
                "/api/tags",
                Some(json!({"name": name, "slug": slug})),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Tagged",
                "slug": "tagged",
                "excerpt": "With metadata",
                "content": "Body",
                "category": "engineering",
                "tags": ["rust", "web"],
                "status": "published",
                "reading_time": 4,
            })),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["category"], "engineering");
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["reading_time"], 4);

    // Category post count reflects the published post
    let response = t.json_request("GET", "/api/categories", None, None, None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["post_count"], 1);
}

#[tokio::test]
async fn test_unknown_category_and_tag_rejected() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Bad category",
                "slug": "bad-category",
                "excerpt": "x",
                "content": "x",
                "category": "does-not-exist",
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Bad tag",
                "slug": "bad-tag",
                "excerpt": "x",
                "content": "x",
                "tags": ["does-not-exist"],
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_creation_is_admin_only() {
    let t = setup().await;
    let editor = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/categories",
            Some(json!({"name": "Engineering", "slug": "engineering"})),
            Some(&editor),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t
        .json_request(
            "POST",
            "/api/tags",
            Some(json!({"name": "Rust", "slug": "rust"})),
            Some(&editor),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_slug_rejected() {
    let t = setup().await;
    let token = t.staff_token("editor@b.com", "editor", "10.0.0.1").await;

    let response = t
        .json_request(
            "POST",
            "/api/posts",
            Some(json!({
                "title": "Bad slug",
                "slug": "Not A Slug",
                "excerpt": "x",
                "content": "x",
                "status": "draft",
            })),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
