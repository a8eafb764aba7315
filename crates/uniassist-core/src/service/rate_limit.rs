//! Fixed-window failure limiter for the OTP mail endpoints.
//!
//! Each client key gets `max_failures` failed requests per window. A request
//! reserves a failure slot up front with [`RateLimiter::reserve`] and hands it
//! back with [`RateLimiter::release`] when it succeeds, so successful requests
//! are never counted and concurrent failures cannot overshoot the budget.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    failures: u32,
}

/// A failure slot held by an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    window_started_at: DateTime<Utc>,
}

pub struct RateLimiter {
    window: Duration,
    max_failures: u32,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_failures: u32) -> Self {
        Self {
            window,
            max_failures,
            windows: DashMap::new(),
        }
    }

    /// Take a failure slot for `key`, or `Err(retry_after)` when the current
    /// window is exhausted.
    pub fn reserve(&self, key: &str, now: DateTime<Utc>) -> Result<Reservation, Duration> {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            failures: 0,
        });
        if now >= entry.started_at + self.window {
            *entry = Window {
                started_at: now,
                failures: 0,
            };
        }
        if entry.failures >= self.max_failures {
            return Err(entry.started_at + self.window - now);
        }
        entry.failures += 1;
        tracing::debug!(key, failures = entry.failures, "rate limiter reserved slot");
        Ok(Reservation {
            window_started_at: entry.started_at,
        })
    }

    /// Give a slot back after the request succeeded. A no-op once the window
    /// it was taken from has been replaced.
    pub fn release(&self, key: &str, reservation: Reservation) {
        if let Some(mut window) = self.windows.get_mut(key) {
            if window.started_at == reservation.window_started_at {
                window.failures = window.failures.saturating_sub(1);
            }
        }
    }

    /// Drop windows that have ended.
    pub fn prune(&self, now: DateTime<Utc>) {
        self.windows
            .retain(|_, w| now < w.started_at + self.window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
