//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info, warn};

/// A well-known placeholder secret that must never reach production.
const PLACEHOLDER_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "inkstone", about = "Blog platform backend with JWT authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8085")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "inkstone.db")]
    pub database: String,

    /// Access token lifetime (e.g. "7d", "12h", "30m")
    #[arg(long, env = "JWT_EXPIRES_IN", default_value = "7d")]
    pub jwt_expires_in: String,

    /// Refresh token lifetime (e.g. "30d")
    #[arg(long, env = "JWT_REFRESH_EXPIRES_IN", default_value = "30d")]
    pub jwt_refresh_expires_in: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded - startup
/// must fail fast rather than per-request. The known placeholder secret is
/// allowed but logged loudly.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.is_empty() {
        error!("JWT secret must not be empty");
        return None;
    }

    if secret == PLACEHOLDER_JWT_SECRET {
        warn!(
            "Using the default placeholder JWT secret. Set a real JWT_SECRET before deploying to production"
        );
    }

    Some(secret)
}

/// Parse a duration string like "7d", "12h", "30m", or "90s" into seconds.
/// A bare number is taken as seconds.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (value, multiplier) = match s.chars().last()? {
        'd' => (&s[..s.len() - 1], 24 * 60 * 60),
        'h' => (&s[..s.len() - 1], 60 * 60),
        'm' => (&s[..s.len() - 1], 60),
        's' => (&s[..s.len() - 1], 1),
        '0'..='9' => (s, 1),
        _ => return None,
    };

    let value: u64 = value.parse().ok()?;
    if value == 0 {
        return None;
    }
    Some(value * multiplier)
}

/// Parse and validate a token lifetime argument.
/// Returns None and logs an error if it cannot be parsed.
pub fn validate_token_ttl(name: &str, value: &str) -> Option<u64> {
    match parse_duration_secs(value) {
        Some(secs) => Some(secs),
        None => {
            error!(
                "{} must be a positive duration like \"7d\", \"12h\", \"30m\", or \"90s\" (got \"{}\")",
                name, value
            );
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        access_ttl_secs,
        refresh_ttl_secs,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
