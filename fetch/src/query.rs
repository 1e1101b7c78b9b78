//! Presets over the envelope: queries fire on activation and whenever their
//! dependencies change, mutations only when asked.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::envelope::{EnvelopeOptions, OpResult, RequestEnvelope};
use crate::state::{Outcome, RequestState};

/// A read that runs as soon as it is created.
///
/// The dependencies are the operation's argument: changing them to a
/// different value re-runs the operation, and the envelope's discard rule
/// guarantees a slow response for old dependencies never lands after the
/// response for new ones.
pub struct Query<D, T> {
    envelope: RequestEnvelope<D, T>,
    deps: Mutex<D>,
}

impl<D, T> Query<D, T>
where
    D: PartialEq + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Must be called from within a Tokio runtime.
    pub fn new<F, Fut>(deps: D, operation: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        Self::with_options(deps, operation, EnvelopeOptions::default())
    }

    pub fn with_options<F, Fut>(
        deps: D,
        operation: F,
        options: EnvelopeOptions<T>,
    ) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        let envelope =
            RequestEnvelope::immediate(operation, options, deps.clone());
        Self {
            envelope,
            deps: Mutex::new(deps),
        }
    }

    /// Swap in new dependencies, re-running the query in the background if
    /// they differ from the current ones. Returns whether it re-ran.
    pub fn set_deps(&self, deps: D) -> bool {
        let mut current = self.deps.lock();
        if *current == deps {
            return false;
        }
        *current = deps.clone();
        drop(current);
        self.envelope.spawn(deps);
        true
    }

    pub fn deps(&self) -> D {
        self.deps.lock().clone()
    }

    /// Run again with the current dependencies.
    pub async fn refetch(&self) -> Outcome<T> {
        let deps = self.deps();
        self.envelope.execute(deps).await
    }

    pub fn state(&self) -> RequestState<T> {
        self.envelope.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.envelope.subscribe()
    }

    pub fn reset(&self) {
        self.envelope.reset()
    }

    pub fn teardown(&self) {
        self.envelope.teardown()
    }
}

/// A write that only runs when `mutate` is called.
pub struct Mutation<A, T> {
    envelope: RequestEnvelope<A, T>,
}

impl<A, T> Mutation<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        Self::with_options(operation, EnvelopeOptions::default())
    }

    pub fn with_options<F, Fut>(
        operation: F,
        options: EnvelopeOptions<T>,
    ) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        Self {
            envelope: RequestEnvelope::with_options(operation, options),
        }
    }

    pub async fn mutate(&self, args: A) -> Outcome<T> {
        self.envelope.execute(args).await
    }

    pub fn state(&self) -> RequestState<T> {
        self.envelope.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.envelope.subscribe()
    }

    pub fn reset(&self) {
        self.envelope.reset()
    }

    pub fn teardown(&self) {
        self.envelope.teardown()
    }
}
