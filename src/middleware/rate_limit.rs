//! Per-client-IP rate limiting over a fixed window.
//!
//! Each client IP gets a counter and a window-start instant. A request
//! inside the window increments the counter; past the limit it is
//! rejected with 429 until the window rolls over. The map is guarded
//! by a mutex and the increment-and-check happens under the lock, so
//! concurrent bursts from one IP cannot undercount. Expired entries
//! are pruned once the map grows past a threshold, bounding memory
//! under client-address churn. State is process-local only.
//!
//! Responses passing through the limiter carry the draft IETF
//! rate-limit headers; a 429 additionally carries `Retry-After`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

/// Prune expired entries once the map holds this many addresses.
const CLEANUP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug)]
struct Entry {
    count: u32,
    window_start: Instant,
}

/// Outcome for one request, with the header values describing the
/// client's remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<IpAddr, Entry>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, ip: IpAddr) -> Decision {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Decision {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= CLEANUP_THRESHOLD {
            let window = self.config.window;
            entries.retain(|_, entry| now.duration_since(entry.window_start) < window);
        }

        let entry = entries.entry(ip).or_insert(Entry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        let elapsed = now.duration_since(entry.window_start);
        let reset_secs = self.config.window.saturating_sub(elapsed).as_secs();

        if entry.count >= self.config.max_requests {
            return Decision {
                allowed: false,
                limit: self.config.max_requests,
                remaining: 0,
                reset_secs,
            };
        }

        entry.count += 1;
        Decision {
            allowed: true,
            limit: self.config.max_requests,
            remaining: self.config.max_requests - entry.count,
            reset_secs,
        }
    }

    #[cfg(test)]
    fn tracked_addresses(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub async fn enforce(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let decision = state.rate_limiter.check(addr.ip());

    if !decision.allowed {
        state.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(client_ip = %addr.ip(), "rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            "too many requests, retry later",
        )
            .into_response();
        response
            .headers_mut()
            .insert("retry-after", count_header(decision.reset_secs));
        apply_rate_limit_headers(&mut response, &decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(&mut response, &decision);
    response
}

fn apply_rate_limit_headers(response: &mut Response, decision: &Decision) {
    let headers = response.headers_mut();
    headers.insert("ratelimit-limit", count_header(u64::from(decision.limit)));
    headers.insert(
        "ratelimit-remaining",
        count_header(u64::from(decision.remaining)),
    );
    headers.insert("ratelimit-reset", count_header(decision.reset_secs));
}

fn count_header(value: u64) -> HeaderValue {
    // Decimal digits are always a valid header value
    HeaderValue::from_str(&value.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn requests_allowed_up_to_the_limit() {
        let limiter = limiter(3, 60);
        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(ip(1));
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
        assert!(!limiter.check(ip(1)).allowed);
    }

    #[test]
    fn hundred_first_request_in_window_is_rejected() {
        let limiter = limiter(100, 900);
        let now = Instant::now();
        for _ in 0..100 {
            assert!(limiter.check_at(ip(1), now).allowed);
        }
        let denied = limiter.check_at(ip(1), now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn clients_are_partitioned_by_ip() {
        let limiter = limiter(1, 60);
        assert!(limiter.check(ip(1)).allowed);
        assert!(!limiter.check(ip(1)).allowed);
        assert!(limiter.check(ip(2)).allowed);
    }

    #[test]
    fn window_rollover_resets_the_counter() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        assert!(limiter.check_at(ip(1), start).allowed);
        assert!(limiter.check_at(ip(1), start).allowed);
        assert!(!limiter.check_at(ip(1), start).allowed);

        let later = start + Duration::from_secs(61);
        let decision = limiter.check_at(ip(1), later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn reset_reflects_time_left_in_window() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        limiter.check_at(ip(1), start);
        let decision = limiter.check_at(ip(1), start + Duration::from_secs(20));
        assert_eq!(decision.reset_secs, 40);
    }

    #[test]
    fn expired_entries_are_pruned_at_the_threshold() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        for i in 0..CLEANUP_THRESHOLD {
            // Distinct addresses spread over two octets
            let addr = IpAddr::from([10, 1, (i / 256) as u8, (i % 256) as u8]);
            limiter.check_at(addr, start);
        }
        assert_eq!(limiter.tracked_addresses(), CLEANUP_THRESHOLD);

        // All previous windows have elapsed; the next check prunes them
        limiter.check_at(ip(1), start + Duration::from_secs(61));
        assert_eq!(limiter.tracked_addresses(), 1);
    }
}
