#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use inkstone::{ServerConfig, create_app, db::Database, jwt::JwtConfig};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

/// Create a test app backed by an in-memory database.
pub async fn setup() -> TestApp {
    setup_with_ttls(
        inkstone::jwt::DEFAULT_ACCESS_TTL_SECS,
        inkstone::jwt::DEFAULT_REFRESH_TTL_SECS,
    )
    .await
}

/// Create a test app with explicit token lifetimes.
pub async fn setup_with_ttls(access_ttl_secs: u64, refresh_ttl_secs: u64) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        access_ttl_secs,
        refresh_ttl_secs,
    };
    TestApp {
        app: create_app(&config),
        db,
        jwt: JwtConfig::with_ttls(TEST_JWT_SECRET, access_ttl_secs, refresh_ttl_secs),
    }
}

impl TestApp {
    /// Send a JSON request. `token` becomes a Bearer Authorization header and
    /// `ip` an X-Forwarded-For header.
    pub async fn json_request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
        ip: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("user-agent", "Mozilla/5.0 (test)");

        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        if let Some(ip) = ip {
            builder = builder.header("x-forwarded-for", ip);
        }

        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Register a user and return the response body.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        ip: &str,
    ) -> serde_json::Value {
        let response = self
            .json_request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "name": name,
                })),
                None,
                Some(ip),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    /// Register a user and return their access token.
    pub async fn register_token(&self, email: &str, password: &str, name: &str, ip: &str) -> String {
        let body = self.register(email, password, name, ip).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Promote a user to a role directly in the database, then log in to get
    /// a token carrying it.
    pub async fn staff_token(&self, email: &str, role: &str, ip: &str) -> String {
        self.register(email, "Abcdef12", "Staff User", ip).await;

        let user = self
            .db
            .users()
            .get_by_email(email)
            .await
            .expect("Failed to look up user")
            .expect("User should exist");
        self.db
            .users()
            .set_role(user.id, inkstone::db::UserRole::from_str(role))
            .await
            .expect("Failed to set role");

        let response = self
            .json_request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "email": email,
                    "password": "Abcdef12",
                })),
                None,
                Some(ip),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
