//! Stored credentials and the unauthorized side channel.

use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

pub const LOGIN_ROUTE: &str = "/login";

/// Receives the side effect of a 401: whatever holds credentials must drop
/// them and send the user back to a login surface.
pub trait SessionHandler: Send + Sync {
    fn session_expired(&self);
}

/// In-process credential store, standing in for browser storage.
pub struct StoredSession {
    token: Mutex<Option<SecretString>>,
    login_route: String,
    redirected_to: Mutex<Option<String>>,
}

impl Default for StoredSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StoredSession {
    pub fn new() -> Self {
        Self::with_login_route(LOGIN_ROUTE)
    }

    pub fn with_login_route(login_route: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(None),
            login_route: login_route.into(),
            redirected_to: Mutex::new(None),
        }
    }

    pub fn store(&self, token: impl Into<String>) {
        *self.token.lock() = Some(SecretString::from(token.into()));
        *self.redirected_to.lock() = None;
    }

    pub fn clear(&self) {
        *self.token.lock() = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.lock().is_some()
    }

    /// A copy of the bearer token for attaching to a request.
    pub fn token(&self) -> Option<String> {
        self.token
            .lock()
            .as_ref()
            .map(|token| token.expose_secret().to_string())
    }

    /// Where the last expired session sent the user, if anywhere.
    pub fn redirected_to(&self) -> Option<String> {
        self.redirected_to.lock().clone()
    }
}

impl SessionHandler for StoredSession {
    fn session_expired(&self) {
        self.clear();
        *self.redirected_to.lock() = Some(self.login_route.clone());
        tracing::info!(
            route = %self.login_route,
            "Session expired, cleared credentials"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_clears_token_and_redirects() {
        let session = StoredSession::new();
        session.store("abc123");
        assert!(session.is_logged_in());
        assert_eq!(session.token().as_deref(), Some("abc123"));

        session.session_expired();

        assert!(!session.is_logged_in());
        assert_eq!(session.redirected_to().as_deref(), Some(LOGIN_ROUTE));
    }

    #[test]
    fn storing_a_token_clears_the_redirect() {
        let session = StoredSession::with_login_route("/auth/sign-in");
        session.session_expired();
        assert_eq!(session.redirected_to().as_deref(), Some("/auth/sign-in"));

        session.store("fresh");
        assert_eq!(session.redirected_to(), None);
    }
}
