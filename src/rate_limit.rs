//! Rate limiting for authentication endpoints.
//!
//! Fixed-window counters keyed per caller identifier (client IP) to prevent
//! brute force attacks. State is process-local; running several instances
//! multiplies the effective limits accordingly.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Login attempts: 5 per 5 minutes per IP.
pub const LOGIN_LIMIT: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Registrations: 3 per 10 minutes per IP.
pub const REGISTER_LIMIT: u32 = 3;
pub const REGISTER_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Store for per-identifier request windows.
///
/// Implementations must serialize the read-then-write on a key so concurrent
/// handlers never under-count denials.
pub trait RateLimitStore: Send + Sync {
    /// Whether a request from `identifier` is allowed right now, counting it
    /// against the window if so.
    fn allow(&self, identifier: &str, limit: u32, window: Duration) -> bool;
}

/// A single counting window for one identifier.
struct RateWindow {
    count: u32,
    reset_at: Instant,
}

/// In-memory fixed-window [`RateLimitStore`].
///
/// Windows are keyed by caller identifier only - NOT by call site. Two
/// routes passing different `limit`/`window` values for the same identifier
/// share one window, so their outcomes depend on call order. This mirrors
/// the inherited behavior and is intentionally not namespaced away.
///
/// Keys are never evicted; the table grows for the process lifetime (known
/// limitation).
#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: RwLock<HashMap<String, RateWindow>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked identifiers.
    pub fn tracked_keys(&self) -> usize {
        self.windows.read().unwrap().len()
    }
}

impl RateLimitStore for FixedWindowLimiter {
    fn allow(&self, identifier: &str, limit: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.write().unwrap();

        match windows.get_mut(identifier) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= limit {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                // First request for this identifier, or the window elapsed.
                windows.insert(
                    identifier.to_string(),
                    RateWindow {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }
}
