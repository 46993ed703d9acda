//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::{BoxFuture, ProviderError};

/// Default timeout applied by the underlying reqwest client.
///
/// Components add their own, shorter per-request deadline on top.
const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 30;

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an HTTP GET request with URL-encoded query parameters.
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>>;

    /// Performs an HTTP POST with a JSON body and extra headers.
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, String)],
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_CLIENT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("roadpilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    async fn read_body(
        response: reqwest::Response,
        url: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ProviderError::Http(format!("Failed to read response: {}", e)))
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| ProviderError::Http(format!("Request failed: {}", e)))?;

            Self::read_body(response, url).await
        })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, String)],
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let mut request = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }

            let response = request
                .send()
                .await
                .map_err(|e| ProviderError::Http(format!("Request failed: {}", e)))?;

            Self::read_body(response, url).await
        })
    }
}
