//! # Rate Limiter
//!
//! Sliding-window request throttling: N events per rolling window per
//! client key.
//!
//! ## How the Window Slides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             Sliding Window (max 3 events / 60s)                         │
//! │                                                                         │
//! │  t=0s   request ──► [0]            3 slots, 1 used ──► allowed          │
//! │  t=10s  request ──► [0,10]                          ──► allowed         │
//! │  t=20s  request ──► [0,10,20]                       ──► allowed         │
//! │  t=30s  request ──► [0,10,20] full                  ──► 429, retry 30s  │
//! │  t=61s  request ──► [10,20,61]  (0 aged out)        ──► allowed         │
//! │                                                                         │
//! │  Advisory throttling only: a rejection touches no transactional state. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The window map lives behind a `Mutex`. Checks are quick (pop expired
//! timestamps, push one), so contention is negligible next to the database
//! work each admitted request goes on to do.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Under the threshold; the event was recorded.
    Allowed,
    /// Over the threshold; retry after roughly this many seconds.
    Limited { retry_after_secs: u64 },
}

/// Sliding-window rate limiter keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    max_events: usize,
    window: Duration,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_events` per `window` per key.
    pub fn new(max_events: usize, window: Duration) -> Self {
        RateLimiter {
            max_events,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Checks (and records) one event for the given key.
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Clock-injected variant of [`check`](Self::check), for tests.
    fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let events = windows.entry(key.to_string()).or_default();

        // Age out events that have left the window
        while let Some(&front) = events.front() {
            if now.duration_since(front) >= self.window {
                events.pop_front();
            } else {
                break;
            }
        }

        if events.len() >= self.max_events {
            let oldest = events.front().copied().unwrap_or(now);
            let elapsed = now.duration_since(oldest);
            let retry_after = self.window.saturating_sub(elapsed);
            debug!(key = %key, "Rate limit exceeded");
            return Decision::Limited {
                // Round up so the client never retries a moment too early
                retry_after_secs: retry_after.as_secs().saturating_add(1),
            };
        }

        events.push_back(now);
        Decision::Allowed
    }
}

/// The key identifying a client for throttling purposes.
///
/// Prefers the proxy-provided client address; falls back to a shared key so
/// direct local traffic is still bounded.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "local".to_string())
}

/// Axum middleware applying the sliding window to a route.
pub async fn limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request);

    match state.limiter.check(&key) {
        Decision::Allowed => Ok(next.run(request).await),
        Decision::Limited { retry_after_secs } => Err(ApiError::rate_limited(retry_after_secs)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max_events() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(limiter.check_at("client", now), Decision::Allowed);
        assert_eq!(limiter.check_at("client", now), Decision::Allowed);
        assert_eq!(limiter.check_at("client", now), Decision::Allowed);
        assert!(matches!(
            limiter.check_at("client", now),
            Decision::Limited { .. }
        ));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(limiter.check_at("client", start), Decision::Allowed);
        assert_eq!(limiter.check_at("client", start), Decision::Allowed);
        assert!(matches!(
            limiter.check_at("client", start + Duration::from_secs(30)),
            Decision::Limited { .. }
        ));

        // After the first event ages out, capacity returns
        assert_eq!(
            limiter.check_at("client", start + Duration::from_secs(61)),
            Decision::Allowed
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(limiter.check_at("client-a", now), Decision::Allowed);
        assert_eq!(limiter.check_at("client-b", now), Decision::Allowed);
        assert!(matches!(
            limiter.check_at("client-a", now),
            Decision::Limited { .. }
        ));
    }

    #[test]
    fn test_retry_after_counts_down() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        limiter.check_at("client", start);
        let Decision::Limited { retry_after_secs } =
            limiter.check_at("client", start + Duration::from_secs(20))
        else {
            panic!("expected limited");
        };

        // 40 seconds of window remain, rounded up
        assert_eq!(retry_after_secs, 41);
    }
}
