//! Tests for transport-level request validation and rate limiting at the
//! HTTP boundary.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{body_json, setup};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_post_without_json_content_type_rejected() {
    let t = setup().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("user-agent", "Mozilla/5.0 (test)")
                .header("content-type", "text/plain")
                .body(Body::from("email=a@b.com"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Content-Type must be application/json");
}

#[tokio::test]
async fn test_post_with_short_user_agent_rejected() {
    let t = setup().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("user-agent", "curl")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email":"a@b.com","password":"Abcdef12"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid User-Agent");
}

#[tokio::test]
async fn test_get_with_short_user_agent_proceeds() {
    let t = setup().await;

    // The same failure is advisory for reads: logged, not blocked
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/posts")
                .header("user-agent", "curl")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_without_user_agent_proceeds() {
    let t = setup().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_content_length_rejected() {
    let t = setup().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("user-agent", "Mozilla/5.0 (test)")
                .header("content-type", "application/json")
                .header("content-length", (11 * 1024 * 1024).to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Request too large");
}

#[tokio::test]
async fn test_login_rate_limit() {
    let t = setup().await;
    t.register("a@b.com", "Abcdef12", "A user", "9.9.9.9").await;

    // 5 attempts per window for this client; wrong passwords still count
    for _ in 0..5 {
        let response = t
            .json_request(
                "POST",
                "/api/auth/login",
                Some(json!({"email": "a@b.com", "password": "Wrong1234"})),
                None,
                Some("7.7.7.7"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = t
        .json_request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "a@b.com", "password": "Abcdef12"})),
            None,
            Some("7.7.7.7"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // Another client is unaffected
    let response = t
        .json_request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "a@b.com", "password": "Abcdef12"})),
            None,
            Some("7.7.7.8"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rate_limit() {
    let t = setup().await;

    for i in 0..3 {
        let response = t
            .json_request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "email": format!("user{}@b.com", i),
                    "password": "Abcdef12",
                    "name": "A user",
                })),
                None,
                Some("9.9.9.9"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = t
        .json_request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "user4@b.com",
                "password": "Abcdef12",
                "name": "A user",
            })),
            None,
            Some("9.9.9.9"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let t = setup().await;

    let response = t.json_request("GET", "/api/auth/me", None, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert!(body["error"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
}
