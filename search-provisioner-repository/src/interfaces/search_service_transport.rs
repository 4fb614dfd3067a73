//! Search service transport trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProvisionError;
use search_provisioner_shared::ResourceKind;

/// Raw response to a PUT. Status classification happens in `ResourceClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Abstract interface for issuing resource declarations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Implementations return `Err` only when no response was received. Any
/// HTTP status, including 4xx and 5xx, comes back as `Ok(TransportResponse)`.
#[async_trait]
pub trait SearchServiceTransport: Send + Sync {
    /// PUT `body` to `{endpoint}/{kind.collection()}/{name}`.
    ///
    /// # Arguments
    ///
    /// * `kind` - Selects the resource collection
    /// * `name` - Resource name, the last path segment
    /// * `body` - JSON payload
    ///
    /// # Returns
    ///
    /// * `Ok(TransportResponse)` - The service responded
    /// * `Err(ProvisionError::Transport)` - The request failed before a response arrived
    async fn put(
        &self,
        kind: ResourceKind,
        name: &str,
        body: &Value,
    ) -> Result<TransportResponse, ProvisionError>;
}
