//! Fixed-window rate limiting per API key.
//!
//! Each key owns one window: the first call opens it with a count of one,
//! calls inside the window increment the count until the limit is reached,
//! and the first call after the window has elapsed opens a fresh one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use notekeeper_core::Clock;
use serde::Serialize;
use tokio::sync::Mutex;

/// Expired windows are swept once the map grows past this many keys.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::seconds(60),
        }
    }
}

/// Quota left after an allowed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

/// A denied call and when the caller may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimited {
    pub limit: u32,
    pub window_secs: u64,
    pub retry_after_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one call against `key`, or reports how long until it may retry.
    pub async fn check_and_increment(&self, key: &str) -> Result<RateStatus, RateLimited> {
        let now = self.clock.now();
        let mut windows = self.windows.lock().await;

        if let Some(window) = windows.get_mut(key) {
            if now - window.started < self.config.window {
                let reset_secs = ceil_secs(window.started + self.config.window - now);
                if window.count >= self.config.max_requests {
                    tracing::warn!(count = window.count, "Rate limit exceeded");
                    return Err(RateLimited {
                        limit: self.config.max_requests,
                        window_secs: ceil_secs(self.config.window),
                        retry_after_secs: reset_secs,
                    });
                }
                window.count += 1;
                return Ok(RateStatus {
                    limit: self.config.max_requests,
                    remaining: self.config.max_requests - window.count,
                    reset_secs,
                });
            }
        }

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.config.window;
            windows.retain(|_, w| now - w.started < window);
        }
        windows.insert(
            key.to_string(),
            Window {
                started: now,
                count: 1,
            },
        );

        Ok(RateStatus {
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(1),
            reset_secs: ceil_secs(self.config.window),
        })
    }

    /// Forgets every window.
    #[cfg(test)]
    pub(crate) async fn reset(&self) {
        self.windows.lock().await.clear();
    }

    #[cfg(test)]
    pub(crate) async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Whole seconds, rounded up, never below one.
fn ceil_secs(d: Duration) -> u64 {
    let ms = d.num_milliseconds().max(0) as u64;
    ms.div_ceil(1000).max(1)
}
