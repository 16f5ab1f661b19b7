pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod revocation;

use api::create_api_router;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use rate_limit::FixedWindowLimiter;
use revocation::InMemoryRevocationStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::with_ttls(
        &config.jwt_secret,
        config.access_ttl_secs,
        config.refresh_ttl_secs,
    ));

    // Process-lifetime shared state: revocations and rate-limit windows are
    // cleared on restart.
    let revocations: Arc<dyn revocation::RevocationStore> =
        Arc::new(InMemoryRevocationStore::new());
    let rate_limiter: Arc<dyn rate_limit::RateLimitStore> = Arc::new(FixedWindowLimiter::new());

    let api_router = create_api_router(config.db.clone(), jwt, revocations, rate_limiter);

    Router::new().nest("/api", api_router)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
