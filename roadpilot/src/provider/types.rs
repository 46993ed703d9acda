//! Provider error type and the boxed future alias used by provider traits.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from external providers (HTTP transport or payload).
///
/// Every variant is contained at the component boundary: callers log it
/// and keep their previous state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, reset, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request did not complete within its deadline.
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The response body was not valid JSON for the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The response decoded but carried no usable data.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl ProviderError {
    /// True for failures worth a warning rather than a debug line.
    ///
    /// Malformed payloads are routine (roads without a limit tag, routes
    /// the provider cannot find) so they are logged quietly.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProviderError::Http(_) | ProviderError::Status { .. } | ProviderError::Timeout(_)
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}
