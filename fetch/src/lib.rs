//! Request-state orchestration for the listings frontend.
//!
//! Every backend call goes through a [`RequestEnvelope`], which owns a
//! `{data, loading, error, success}` snapshot and guarantees that the most
//! recently issued call is the one whose result is kept. The other
//! components are built from it: [`Query`] and [`Mutation`] presets, the
//! [`PaginationController`], the [`InfiniteScroll`] accumulator and the
//! [`DebouncedQuery`] wrapper.

pub mod auth;
pub mod debounce;
pub mod envelope;
pub mod error;
pub mod generation;
pub mod hooks;
pub mod infinite;
pub mod pagination;
pub mod query;
pub mod rate_limit;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod time;

pub use auth::Authenticator;
pub use debounce::DebouncedQuery;
pub use envelope::{EnvelopeOptions, OpResult, RequestEnvelope};
pub use error::{ErrorPolicy, Failure, FailureKind};
pub use infinite::{InfiniteScroll, InfiniteScrollState};
pub use pagination::{PageRequest, PaginationController, PaginationState};
pub use query::{Mutation, Query};
pub use session::{SessionHandler, StoredSession};
pub use state::{Outcome, Phase, RequestState};

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use payloads::APIClient;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the backend lives, without the trailing `/api`.
    pub backend_url: String,
    /// Applied to every request by the HTTP client; this layer adds none of
    /// its own.
    pub request_timeout: Duration,
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let page_size = parse_or(&lookup, "PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }
        Ok(Self {
            backend_url: lookup("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            request_timeout: Duration::from_millis(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_MS",
                defaults.request_timeout.as_millis() as u64,
            )?),
            page_size,
            search_debounce: Duration::from_millis(parse_or(
                &lookup,
                "SEARCH_DEBOUNCE_MS",
                defaults.search_debounce.as_millis() as u64,
            )?),
        })
    }

    pub fn api_client(&self) -> anyhow::Result<APIClient> {
        let inner_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(APIClient {
            address: self.backend_url.clone(),
            inner_client,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {name}: {value:?}")),
        None => Ok(default),
    }
}
