//! Coalescing rapid calls into one dispatch after a quiet period.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::envelope::{EnvelopeOptions, OpResult, RequestEnvelope};
use crate::state::RequestState;

struct Pending<A> {
    args: Option<A>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every call so a timer that lost the race to `abort` can
    /// tell it is no longer the latest.
    ticket: u64,
    torn_down: bool,
}

/// Wraps an envelope so that only the last call in a burst reaches it.
///
/// Each `execute` (re)starts a timer of `delay`; when a timer runs out
/// without being replaced, the envelope executes once with the most recent
/// arguments. Dropping the wrapper cancels anything still pending.
pub struct DebouncedQuery<A, T> {
    envelope: RequestEnvelope<A, T>,
    delay: Duration,
    pending: Arc<Mutex<Pending<A>>>,
}

impl<A, T> DebouncedQuery<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(delay: Duration, operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        Self::with_options(delay, operation, EnvelopeOptions::default())
    }

    pub fn with_options<F, Fut>(
        delay: Duration,
        operation: F,
        options: EnvelopeOptions<T>,
    ) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        Self::wrap(RequestEnvelope::with_options(operation, options), delay)
    }

    pub fn wrap(envelope: RequestEnvelope<A, T>, delay: Duration) -> Self {
        Self {
            envelope,
            delay,
            pending: Arc::new(Mutex::new(Pending {
                args: None,
                timer: None,
                ticket: 0,
                torn_down: false,
            })),
        }
    }

    /// Record `args` and restart the timer. Nothing is sent yet.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn execute(&self, args: A) {
        let mut pending = self.pending.lock();
        if pending.torn_down {
            tracing::debug!("Debounced query torn down, ignoring call");
            return;
        }
        pending.ticket += 1;
        pending.args = Some(args);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }

        let ticket = pending.ticket;
        let delay = self.delay;
        let shared = self.pending.clone();
        let envelope = self.envelope.clone();
        pending.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let args = {
                let mut pending = shared.lock();
                if pending.ticket != ticket || pending.torn_down {
                    return;
                }
                pending.timer = None;
                pending.args.take()
            };
            if let Some(args) = args {
                tracing::debug!(?delay, "Quiet period over, dispatching");
                envelope.execute(args).await;
            }
        }));
    }

    /// Whether a call is waiting for its quiet period to end.
    pub fn has_pending(&self) -> bool {
        self.pending.lock().args.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> RequestState<T> {
        self.envelope.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.envelope.subscribe()
    }

    pub fn reset(&self) {
        self.cancel();
        self.envelope.reset();
    }
}

impl<A, T> DebouncedQuery<A, T> {
    /// Drop the pending call, if any, without dispatching it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        pending.args = None;
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }

    /// Cancel the pending call and stop the envelope from accepting results.
    /// Further `execute` calls are ignored.
    pub fn teardown(&self) {
        self.pending.lock().torn_down = true;
        self.cancel();
        self.envelope.teardown();
    }
}

impl<A, T> Drop for DebouncedQuery<A, T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
