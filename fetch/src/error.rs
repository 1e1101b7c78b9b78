//! Turning a rejected operation into a message a person can act on.

use std::sync::Arc;

use payloads::ClientError;
use reqwest::StatusCode;

use crate::session::SessionHandler;

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
pub const NETWORK_MESSAGE: &str =
    "Network error. Please check your connection.";
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Session expired. Please login again.";
pub const FORBIDDEN_MESSAGE: &str =
    "You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
pub const VALIDATION_MESSAGE: &str =
    "Validation failed. Please check your input.";
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Network,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Server,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Classify an error, checking the categories in priority order. `action`
/// completes the generic fallback, e.g. "load properties" gives
/// "Failed to load properties."
pub fn classify(error: &ClientError, action: &str) -> Failure {
    let (kind, message) = match error {
        ClientError::Timeout => (FailureKind::Timeout, TIMEOUT_MESSAGE.into()),
        ClientError::Network(_) => {
            (FailureKind::Network, NETWORK_MESSAGE.into())
        }
        ClientError::APIError(status, _) => match *status {
            StatusCode::UNAUTHORIZED => {
                (FailureKind::Unauthorized, SESSION_EXPIRED_MESSAGE.into())
            }
            StatusCode::FORBIDDEN => {
                (FailureKind::Forbidden, FORBIDDEN_MESSAGE.into())
            }
            StatusCode::NOT_FOUND => {
                (FailureKind::NotFound, NOT_FOUND_MESSAGE.into())
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                (FailureKind::Validation, VALIDATION_MESSAGE.into())
            }
            status if status.is_server_error() => {
                (FailureKind::Server, SERVER_MESSAGE.into())
            }
            _ => (FailureKind::Other, fallback(error, action)),
        },
        ClientError::Decode(_) | ClientError::Unsuccessful { .. } => {
            (FailureKind::Other, fallback(error, action))
        }
    };
    Failure { kind, message }
}

fn fallback(error: &ClientError, action: &str) -> String {
    match error.backend_message() {
        Some(message) => message.to_string(),
        None => format!("Failed to {action}."),
    }
}

/// How a component reports failures: the fallback action text and the
/// handler to notify when the session has expired.
#[derive(Clone)]
pub struct ErrorPolicy {
    action: String,
    session: Option<Arc<dyn SessionHandler>>,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::new("complete the request")
    }
}

impl ErrorPolicy {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            session: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_session(mut self, session: Arc<dyn SessionHandler>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Classify and log the error, firing the session side channel on a
    /// 401. The side channel fires even for superseded requests, since the
    /// stored credentials are stale either way.
    pub fn resolve(&self, error: &ClientError) -> Failure {
        let failure = classify(error, &self.action);
        tracing::warn!(
            action = %self.action,
            kind = ?failure.kind,
            error = %error,
            "Request failed"
        );
        if failure.kind == FailureKind::Unauthorized {
            match &self.session {
                Some(session) => session.session_expired(),
                None => tracing::debug!("No session handler for 401"),
            }
        }
        failure
    }
}
