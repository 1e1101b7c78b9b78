//! Login flow: rate limiting in front of the login mutation, with the
//! resulting token kept in a [`StoredSession`].

use std::future::Future;
use std::sync::Arc;

use payloads::Session;
use payloads::requests::LoginCredentials;
use tokio::sync::watch;

use crate::envelope::{EnvelopeOptions, OpResult};
use crate::query::Mutation;
use crate::rate_limit::LoginRateLimiter;
use crate::session::StoredSession;
use crate::state::{Outcome, RequestState};

pub struct Authenticator {
    limiter: LoginRateLimiter,
    mutation: Mutation<LoginCredentials, Session>,
    session: Arc<StoredSession>,
}

impl Authenticator {
    pub fn new<F, Fut>(
        operation: F,
        session: Arc<StoredSession>,
        limiter: LoginRateLimiter,
    ) -> Self
    where
        F: Fn(LoginCredentials) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Session>> + Send + 'static,
    {
        Self {
            limiter,
            mutation: Mutation::with_options(
                operation,
                EnvelopeOptions::new().action("log in"),
            ),
            session,
        }
    }

    /// Attempt a login. While the email is locked out this fails without
    /// contacting the backend.
    pub async fn login(
        &self,
        credentials: LoginCredentials,
    ) -> Outcome<Session> {
        if let Err(e) = self.limiter.check(&credentials.email) {
            tracing::info!("Login refused by rate limiter");
            return Outcome::Failure(e.to_string());
        }
        let email = credentials.email.clone();
        let outcome = self.mutation.mutate(credentials).await;
        match &outcome {
            Outcome::Success(session) => {
                self.limiter.record_success(&email);
                self.session.store(session.token.clone());
                tracing::info!(user_id = %session.user.id, "Logged in");
            }
            Outcome::Failure(_) => {
                if let Err(e) = self.limiter.record_failure(&email) {
                    tracing::info!(error = %e, "Further logins locked");
                }
            }
            Outcome::Superseded => {}
        }
        outcome
    }

    pub fn logout(&self) {
        self.session.clear();
        self.mutation.reset();
        tracing::info!("Logged out");
    }

    pub fn remaining_attempts(&self, email: &str) -> u32 {
        self.limiter.remaining_attempts(email)
    }

    pub fn session(&self) -> &Arc<StoredSession> {
        &self.session
    }

    pub fn state(&self) -> RequestState<Session> {
        self.mutation.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<Session>> {
        self.mutation.subscribe()
    }
}
