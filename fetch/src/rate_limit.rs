//! Client-side throttling of login attempts.

use std::collections::HashMap;

use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;

use crate::time::TimeSource;

pub const MAX_ATTEMPTS: u32 = 5;
pub const ATTEMPT_WINDOW: SignedDuration = SignedDuration::from_mins(15);
pub const LOCKOUT: SignedDuration = SignedDuration::from_mins(15);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error(
        "Too many login attempts. Please try again in {} minute(s).",
        whole_minutes(.retry_after)
    )]
    Locked { retry_after: SignedDuration },
}

/// Minutes rounded up, never less than one.
fn whole_minutes(duration: &SignedDuration) -> i64 {
    let secs = duration.as_secs().max(1);
    (secs + 59) / 60
}

#[derive(Debug, Default)]
struct Attempts {
    failures: Vec<Timestamp>,
    locked_until: Option<Timestamp>,
}

/// Counts failed logins per email. After `max_attempts` failures inside
/// `window`, further attempts for that email are refused for `lockout`.
pub struct LoginRateLimiter {
    time_source: TimeSource,
    max_attempts: u32,
    window: SignedDuration,
    lockout: SignedDuration,
    attempts: Mutex<HashMap<String, Attempts>>,
}

impl LoginRateLimiter {
    pub fn new(time_source: TimeSource) -> Self {
        Self::with_limits(time_source, MAX_ATTEMPTS, ATTEMPT_WINDOW, LOCKOUT)
    }

    pub fn with_limits(
        time_source: TimeSource,
        max_attempts: u32,
        window: SignedDuration,
        lockout: SignedDuration,
    ) -> Self {
        Self {
            time_source,
            max_attempts: max_attempts.max(1),
            window,
            lockout,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `email` may attempt a login right now.
    pub fn check(&self, email: &str) -> Result<(), RateLimitError> {
        let now = self.time_source.now();
        let mut attempts = self.attempts.lock();
        let key = normalize(email);
        let Some(locked_until) = attempts.get(&key).map(|a| a.locked_until)
        else {
            return Ok(());
        };
        match locked_until {
            Some(until) if until > now => Err(RateLimitError::Locked {
                retry_after: until.duration_since(now),
            }),
            Some(_) => {
                attempts.remove(&key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Count a failed attempt. Returns how many attempts remain, or the
    /// lockout this failure triggered.
    pub fn record_failure(&self, email: &str) -> Result<u32, RateLimitError> {
        let now = self.time_source.now();
        let mut attempts = self.attempts.lock();
        let entry = attempts.entry(normalize(email)).or_default();
        let window_start = now - self.window;
        entry.failures.retain(|at| *at > window_start);
        entry.failures.push(now);

        let used = entry.failures.len() as u32;
        if used < self.max_attempts {
            return Ok(self.max_attempts - used);
        }
        let until = now + self.lockout;
        entry.failures.clear();
        entry.locked_until = Some(until);
        tracing::info!(%until, "Login locked after repeated failures");
        Err(RateLimitError::Locked {
            retry_after: self.lockout,
        })
    }

    pub fn record_success(&self, email: &str) {
        self.attempts.lock().remove(&normalize(email));
    }

    pub fn remaining_attempts(&self, email: &str) -> u32 {
        let window_start = self.time_source.now() - self.window;
        let attempts = self.attempts.lock();
        let used = attempts
            .get(&normalize(email))
            .map(|entry| {
                entry.failures.iter().filter(|at| **at > window_start).count()
            })
            .unwrap_or(0) as u32;
        self.max_attempts.saturating_sub(used)
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}
