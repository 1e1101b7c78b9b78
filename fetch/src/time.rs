use jiff::Timestamp;
#[cfg(any(feature = "mock-time", test))]
use parking_lot::Mutex;
#[cfg(any(feature = "mock-time", test))]
use std::sync::Arc;

/// Where the login rate limiter reads the current time from.
#[derive(Clone)]
pub struct TimeSource {
    #[cfg(any(feature = "mock-time", test))]
    time: Arc<Mutex<Timestamp>>,
}

impl TimeSource {
    #[allow(clippy::new_without_default)]
    #[cfg(not(any(feature = "mock-time", test)))]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(any(feature = "mock-time", test))]
    pub fn new(initial_time: Timestamp) -> Self {
        Self {
            time: Arc::new(Mutex::new(initial_time)),
        }
    }

    #[cfg(not(any(feature = "mock-time", test)))]
    pub fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    #[cfg(any(feature = "mock-time", test))]
    pub fn now(&self) -> Timestamp {
        *self.time.lock()
    }

    #[cfg(any(feature = "mock-time", test))]
    pub fn advance(&self, duration: jiff::Span) {
        *self.time.lock() += duration;
    }

    #[cfg(any(feature = "mock-time", test))]
    pub fn set(&self, time: Timestamp) {
        *self.time.lock() = time;
    }
}
