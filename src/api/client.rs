//! HTTP client shared by all endpoints.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::{ApiError, ErrorMessages};
use super::tickets::TicketEndpoint;
use super::types::ErrorBody;
use super::users::UserApi;
use crate::auth::AuthSession;
use crate::scanner::ApiConfig;

/// Client for the booking platform REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Adds a scheme if missing and trims trailing slashes.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

impl ApiClient {
    /// Creates a client for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url);
        if base_url != config.base_url {
            tracing::debug!(from = %config.base_url, to = %base_url, "Normalized API base URL");
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        tracing::info!(base_url = %base_url, "API client ready");
        Ok(Self { client, base_url })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub(crate) fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    /// Sends a request and decodes a success body as `T`.
    ///
    /// Non-success statuses are mapped through `messages`; a request that
    /// never got a response becomes [`ApiError::Network`].
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        messages: &ErrorMessages,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed without response");
            ApiError::network(messages)
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), body.message, messages);
        tracing::debug!(status = status.as_u16(), error = %err, "Request rejected");
        Err(err)
    }

    /// Account endpoints.
    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Ticket verification endpoint bound to a logged-in session.
    pub fn ticket_endpoint(&self, session: &AuthSession) -> Result<TicketEndpoint, ApiError> {
        if !session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let token = session.token().ok_or(ApiError::NotAuthenticated)?;
        Ok(TicketEndpoint::new(self.clone(), token.to_string()))
    }
}
