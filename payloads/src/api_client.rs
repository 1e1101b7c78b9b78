use crate::{
    ApiResponse, ErrorBody, Paginated, Property, PropertyId, Session,
    requests,
};
use reqwest::StatusCode;
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// An API client for interfacing with the listings backend.
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    fn format_url(&self, path: &str) -> String {
        format!("{}/api/{path}", &self.address)
    }

    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        token: Option<&str>,
    ) -> ReqwestResult {
        let mut request =
            self.inner_client.post(self.format_url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    async fn get(&self, path: &str, query: &impl Serialize) -> ReqwestResult {
        self.inner_client
            .get(self.format_url(path))
            .query(query)
            .send()
            .await
    }

    async fn empty_get(&self, path: &str) -> ReqwestResult {
        self.inner_client.get(self.format_url(path)).send().await
    }
}

/// Methods on the backend API
impl APIClient {
    pub async fn health_check(&self) -> Result<(), ClientError> {
        let response = self.empty_get("health_check").await?;
        ok_empty(response).await
    }

    pub async fn login(
        &self,
        details: &requests::LoginCredentials,
    ) -> Result<ApiResponse<Session>, ClientError> {
        let response = self.post("login", details, None).await?;
        ok_body(response).await
    }

    /// Fetch one page of listings matching the filters.
    pub async fn list_properties(
        &self,
        page: u32,
        limit: u32,
        filters: &requests::PropertyFilters,
    ) -> Result<ApiResponse<Paginated<Property>>, ClientError> {
        let response = self
            .inner_client
            .get(self.format_url("properties"))
            .query(&[("page", page), ("limit", limit)])
            .query(filters)
            .send()
            .await?;
        ok_body(response).await
    }

    pub async fn search_properties(
        &self,
        details: &requests::SearchProperties,
    ) -> Result<ApiResponse<Vec<Property>>, ClientError> {
        let response = self.get("properties/search", details).await?;
        ok_body(response).await
    }

    pub async fn get_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<ApiResponse<Property>, ClientError> {
        let response =
            self.empty_get(&format!("properties/{property_id}")).await?;
        ok_body(response).await
    }

    /// Publish a new listing. Requires the token from a previous login.
    pub async fn create_property(
        &self,
        details: &requests::CreateProperty,
        token: Option<&str>,
    ) -> Result<ApiResponse<Property>, ClientError> {
        let response = self.post("properties", details, token).await?;
        ok_body(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request timeout. Please try again.")]
    Timeout,
    /// No response was received at all.
    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),
    #[error("Unexpected response from server")]
    Decode(#[source] reqwest::Error),
    /// A non-success status, containing the parsed error body.
    #[error("{1}")]
    APIError(StatusCode, ErrorBody),
    /// A 2xx response whose envelope reported failure or carried no data.
    #[error("{}", .message.as_deref().unwrap_or("Request was not successful"))]
    Unsuccessful { message: Option<String> },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e)
        } else {
            Self::Network(e)
        }
    }
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::APIError(status, _) => Some(*status),
            _ => None,
        }
    }

    /// The message the backend supplied, if there was one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::APIError(_, body) if !body.message.is_empty() => {
                Some(&body.message)
            }
            Self::Unsuccessful { message } => message.as_deref(),
            _ => None,
        }
    }
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await?);
    }
    Ok(response.json::<T>().await?)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await?);
    }
    Ok(())
}

/// Read an error body, falling back to the raw text when the backend did
/// not send the structured shape.
async fn api_error(
    response: reqwest::Response,
) -> Result<ClientError, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .filter(|body| !body.message.is_empty())
        .unwrap_or_else(|| ErrorBody {
            message: text,
            status_code: status.as_u16(),
            details: None,
        });
    Ok(ClientError::APIError(status, body))
}
