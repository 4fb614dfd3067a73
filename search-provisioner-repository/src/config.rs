//! Configuration types for the search service transport.

use std::time::Duration;

/// API version every request is pinned to.
pub const DEFAULT_API_VERSION: &str = "2024-07-01";

/// Configuration for `AzureSearchTransport`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
