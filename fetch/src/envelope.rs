//! The request envelope: one externally supplied async operation wrapped
//! with uniform `{data, loading, error, success}` state.
//!
//! Every `execute` takes a ticket from a [`Generation`]. Results commit only
//! if their ticket is still the latest one issued, so the last request
//! *issued* wins even when an earlier one resolves after it. Ticket checks
//! and state writes both happen under the watch channel's lock.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use payloads::{ApiResponse, ClientError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ErrorPolicy;
use crate::generation::Generation;
use crate::session::SessionHandler;
use crate::state::{Outcome, RequestState};

/// What an injected backend call resolves to.
pub type OpResult<T> = Result<ApiResponse<T>, ClientError>;

pub(crate) type Operation<A, T> =
    dyn Fn(A) -> BoxFuture<'static, OpResult<T>> + Send + Sync;

pub(crate) fn box_operation<A, T, F, Fut>(operation: F) -> Box<Operation<A, T>>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OpResult<T>> + Send + 'static,
{
    Box::new(move |args| operation(args).boxed())
}

type SuccessHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Failure reporting and side-effect hooks for an envelope.
pub struct EnvelopeOptions<T> {
    policy: ErrorPolicy,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
}

impl<T> Default for EnvelopeOptions<T> {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> EnvelopeOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Used in the fallback message, e.g. "load properties".
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.policy = self.policy.with_action(action);
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionHandler>) -> Self {
        self.policy = self.policy.with_session(session);
        self
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn on_success(
        mut self,
        hook: impl Fn(&T) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

struct Inner<A, T> {
    operation: Box<Operation<A, T>>,
    options: EnvelopeOptions<T>,
    generation: Generation,
    state: watch::Sender<RequestState<T>>,
}

/// Cheaply cloneable handle; clones share state.
pub struct RequestEnvelope<A, T> {
    inner: Arc<Inner<A, T>>,
}

impl<A, T> Clone for RequestEnvelope<A, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A, T> RequestEnvelope<A, T>
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
        let (state, _) = watch::channel(RequestState::default());
        Self {
            inner: Arc::new(Inner {
                operation: box_operation(operation),
                options,
                generation: Generation::new(),
                state,
            }),
        }
    }

    /// Build an envelope and fire it once right away with `args`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn immediate<F, Fut>(
        operation: F,
        options: EnvelopeOptions<T>,
        args: A,
    ) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<T>> + Send + 'static,
    {
        let envelope = Self::with_options(operation, options);
        envelope.spawn(args);
        envelope
    }

    /// Run `execute` on a background task.
    pub fn spawn(&self, args: A) -> JoinHandle<Outcome<T>> {
        let envelope = self.clone();
        tokio::spawn(async move { envelope.execute(args).await })
    }

    pub async fn execute(&self, args: A) -> Outcome<T> {
        self.execute_with(args, |_| {}).await
    }

    /// Like `execute`, but `on_commit` runs inside the commit itself, so
    /// layered state can never diverge from the envelope's data.
    pub(crate) async fn execute_with<C>(
        &self,
        args: A,
        on_commit: C,
    ) -> Outcome<T>
    where
        C: FnOnce(&T) + Send,
    {
        let inner = &self.inner;
        let mut ticket = None;
        inner.state.send_if_modified(|state| {
            ticket = inner.generation.issue();
            if ticket.is_some() {
                state.begin();
            }
            ticket.is_some()
        });
        let Some(ticket) = ticket else {
            tracing::debug!(
                action = inner.options.policy.action(),
                "Envelope torn down, not executing"
            );
            return Outcome::Superseded;
        };
        tracing::debug!(
            action = inner.options.policy.action(),
            ?ticket,
            "Executing"
        );

        let result = (inner.operation)(args)
            .await
            .and_then(ApiResponse::into_data);

        match result {
            Ok(data) => {
                let committed = inner.state.send_if_modified(|state| {
                    if !inner.generation.is_current(ticket) {
                        return false;
                    }
                    on_commit(&data);
                    state.succeed(data.clone());
                    true
                });
                if !committed {
                    tracing::debug!(?ticket, "Discarding superseded result");
                    return Outcome::Superseded;
                }
                if let Some(hook) = &inner.options.on_success {
                    hook(&data);
                }
                Outcome::Success(data)
            }
            Err(e) => {
                let failure = inner.options.policy.resolve(&e);
                let committed = inner.state.send_if_modified(|state| {
                    if !inner.generation.is_current(ticket) {
                        return false;
                    }
                    state.fail(failure.message.clone());
                    true
                });
                if !committed {
                    tracing::debug!(?ticket, "Discarding superseded failure");
                    return Outcome::Superseded;
                }
                if let Some(hook) = &inner.options.on_error {
                    hook(&failure.message);
                }
                Outcome::Failure(failure.message)
            }
        }
    }

    /// Return to the initial state. Anything still in flight is discarded
    /// when it resolves.
    pub fn reset(&self) {
        let inner = &self.inner;
        inner.state.send_modify(|state| {
            inner.generation.invalidate();
            *state = RequestState::default();
        });
    }

    pub fn state(&self) -> RequestState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.inner.state.subscribe()
    }
}

impl<A, T> RequestEnvelope<A, T> {
    /// Stop accepting results for good. Later `execute` calls resolve to
    /// `Superseded` without running the operation.
    pub fn teardown(&self) {
        let inner = &self.inner;
        inner.state.send_if_modified(|_| {
            inner.generation.retire();
            false
        });
    }

    /// Discard whatever is in flight while keeping the committed data.
    pub(crate) fn supersede(&self) {
        let inner = &self.inner;
        inner.state.send_if_modified(|state| {
            inner.generation.invalidate();
            std::mem::replace(&mut state.loading, false)
        });
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.generation.is_retired()
    }
}
