//! Append-only consumption of a paginated endpoint.

use std::future::Future;

use payloads::{ApiResponse, Paginated};
use tokio::sync::watch;

use crate::envelope::{OpResult, Operation, box_operation};
use crate::error::ErrorPolicy;
use crate::generation::{Generation, Ticket};
use crate::pagination::PageRequest;
use crate::state::Outcome;

#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteScrollState<T> {
    /// Every item loaded so far, in arrival order. Only `reset` shrinks it.
    pub items: Vec<T>,
    /// The next page to request.
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for InfiniteScrollState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            error: None,
        }
    }
}

enum Start {
    Guarded,
    TornDown,
    Issued(Ticket, u32),
}

pub struct InfiniteScroll<T, X> {
    operation: Box<Operation<PageRequest<X>, Paginated<T>>>,
    limit: u32,
    policy: ErrorPolicy,
    generation: Generation,
    state: watch::Sender<InfiniteScrollState<T>>,
}

impl<T, X> InfiniteScroll<T, X>
where
    T: Clone + Send + Sync + 'static,
    X: Send + 'static,
{
    pub fn new<F, Fut>(limit: u32, operation: F) -> Self
    where
        F: Fn(PageRequest<X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Paginated<T>>> + Send + 'static,
    {
        Self::with_policy(limit, operation, ErrorPolicy::default())
    }

    pub fn with_policy<F, Fut>(
        limit: u32,
        operation: F,
        policy: ErrorPolicy,
    ) -> Self
    where
        F: Fn(PageRequest<X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Paginated<T>>> + Send + 'static,
    {
        let (state, _) = watch::channel(InfiniteScrollState::default());
        Self {
            operation: box_operation(operation),
            limit: limit.max(1),
            policy,
            generation: Generation::new(),
            state,
        }
    }

    /// Fetch the next page and append it.
    ///
    /// Returns `None` without requesting anything while a load is running or
    /// once the backend has reported there is nothing more. A failure leaves
    /// `page` alone, so calling again retries the same page.
    pub async fn load_more(&self, extra: X) -> Option<Outcome<Vec<T>>> {
        let mut start = Start::Guarded;
        self.state.send_if_modified(|state| {
            if state.loading || !state.has_more {
                return false;
            }
            match self.generation.issue() {
                Some(ticket) => {
                    state.loading = true;
                    state.error = None;
                    start = Start::Issued(ticket, state.page);
                    true
                }
                None => {
                    start = Start::TornDown;
                    false
                }
            }
        });
        let (ticket, page) = match start {
            Start::Guarded => return None,
            Start::TornDown => return Some(Outcome::Superseded),
            Start::Issued(ticket, page) => (ticket, page),
        };
        tracing::debug!(page, limit = self.limit, ?ticket, "Loading more");

        let request = PageRequest {
            page,
            limit: self.limit,
            extra,
        };
        let result = (self.operation)(request)
            .await
            .and_then(ApiResponse::into_data);

        let outcome = match result {
            Ok(response) => {
                let committed = self.state.send_if_modified(|state| {
                    if !self.generation.is_current(ticket) {
                        return false;
                    }
                    state.items.extend(response.data.iter().cloned());
                    state.page = page + 1;
                    state.has_more = response.has_next;
                    state.loading = false;
                    true
                });
                committed.then(|| Outcome::Success(response.data))
            }
            Err(e) => {
                let failure = self.policy.resolve(&e);
                let committed = self.state.send_if_modified(|state| {
                    if !self.generation.is_current(ticket) {
                        return false;
                    }
                    state.error = Some(failure.message.clone());
                    state.loading = false;
                    true
                });
                committed.then(|| Outcome::Failure(failure.message))
            }
        };
        Some(outcome.unwrap_or_else(|| {
            tracing::debug!(?ticket, "Discarding superseded page");
            Outcome::Superseded
        }))
    }

    /// Start over from page 1, dropping whatever is still in flight.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.invalidate();
            *state = InfiniteScrollState::default();
        });
    }

    pub fn teardown(&self) {
        self.state.send_if_modified(|_| {
            self.generation.retire();
            false
        });
    }

    pub fn state(&self) -> InfiniteScrollState<T> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InfiniteScrollState<T>> {
        self.state.subscribe()
    }
}
