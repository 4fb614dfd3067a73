//! Provisioning error types.
//!
//! Every ensure operation reports failures through `ProvisionError`. The
//! driver logs them and moves on to the next resource; none is retried.

use search_provisioner_shared::ResourceKind;
use thiserror::Error;

/// Errors that can occur while declaring a resource.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// The service answered with a status outside `[200, 300)`.
    #[error("{kind} '{name}' rejected with status {status}: {body}")]
    RemoteRejection {
        kind: ResourceKind,
        name: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The definition failed local validation and was not sent.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

impl ProvisionError {
    /// Create a remote rejection error.
    pub fn remote_rejection(
        kind: ResourceKind,
        name: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::RemoteRejection {
            kind,
            name: name.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an invalid definition error.
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. })
    }

    /// HTTP status, when the service responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }
}
