/// Snapshot of one request envelope.
///
/// Only the envelope writes to this. After the first invocation exactly one
/// of these holds: loading, succeeded (with no error), or failed (with an
/// error and no data).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            success: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

impl<T> RequestState<T> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.success {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.success = false;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        *self = Self {
            data: Some(data),
            loading: false,
            error: None,
            success: true,
        };
    }

    pub(crate) fn fail(&mut self, message: String) {
        *self = Self {
            data: None,
            loading: false,
            error: Some(message),
            success: false,
        };
    }
}

/// How a single `execute` resolved. Never an `Err`: failures are values.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(String),
    /// A later call, a reset, or teardown happened first; the result was
    /// discarded without touching state.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(data) => Outcome::Success(f(data)),
            Self::Failure(message) => Outcome::Failure(message),
            Self::Superseded => Outcome::Superseded,
        }
    }
}
