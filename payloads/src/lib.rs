pub mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError};
pub use responses::{Property, Session};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id type wrapper helps ensure we don't mix up ids for different resources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PropertyId(pub Uuid);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[display("apartment")]
    Apartment,
    #[display("house")]
    House,
    #[display("studio")]
    Studio,
    #[display("shared_room")]
    SharedRoom,
}

/// The envelope every backend endpoint responds with.
///
/// `data` is optional on the wire because failed responses omit it; use
/// [`ApiResponse::into_data`] to get at the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Unwrap the payload, treating `success: false` or a missing `data`
    /// field as a failure. The backend's `error` text wins over `message`.
    pub fn into_data(self) -> Result<T, ClientError> {
        match self {
            Self {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            Self { message, error, .. } => {
                Err(ClientError::Unsuccessful {
                    message: error.or(message).filter(|m| !m.is_empty()),
                })
            }
        }
    }
}

/// One page of a list endpoint. Counters the backend leaves out default to
/// zero/false; nothing is inferred from the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    /// Build a page the way the backend does, deriving the counters from
    /// the full item count.
    pub fn from_slice(items: &[T], page: u32, limit: u32) -> Self
    where
        T: Clone,
    {
        let total = items.len() as u64;
        let limit = limit.max(1);
        let total_pages = total.div_ceil(u64::from(limit)) as u32;
        let start = (page.saturating_sub(1) as usize) * limit as usize;
        let data = items
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        Self {
            data,
            total,
            page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// The body of a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
