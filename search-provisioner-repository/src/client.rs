//! Resource client implementation.
//!
//! This module provides the client the registrars use to declare resources.
//! It serializes a definition, issues exactly one PUT through the transport
//! and classifies the response.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::errors::ProvisionError;
use crate::interfaces::SearchServiceTransport;
use search_provisioner_shared::{Outcome, ResourceDefinition};

/// Declares resources with create-or-replace semantics.
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn SearchServiceTransport>,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn SearchServiceTransport>) -> Self {
        Self { transport }
    }

    /// Create or replace a resource.
    /// Input: any `ResourceDefinition`
    /// Output: `Outcome::Created` on 201, `Outcome::Replaced` with the status on any other 2xx,
    /// `ProvisionError::RemoteRejection` otherwise.
    ///
    /// A single request is issued; nothing is retried.
    #[instrument(skip(self, definition), fields(resource = %R::KIND, name = definition.name()))]
    pub async fn put<R: ResourceDefinition>(&self, definition: &R) -> Result<Outcome, ProvisionError> {
        let body = serde_json::to_value(definition)
            .map_err(|e| ProvisionError::serialization(e.to_string()))?;

        let response = self
            .transport
            .put(R::KIND, definition.name(), &body)
            .await?;

        match Outcome::from_status(response.status) {
            Some(outcome) => {
                info!(status = response.status, %outcome, "Resource declared");
                Ok(outcome)
            }
            None => {
                error!(status = response.status, body = %response.body, "Resource rejected");
                Err(ProvisionError::remote_rejection(
                    R::KIND,
                    definition.name(),
                    response.status,
                    response.body,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::TransportResponse;
    use async_trait::async_trait;
    use search_provisioner_shared::{DataSourceDefinition, ResourceKind};
    use serde_json::Value;
    use tokio::sync::Mutex;

    /// Mock transport returning a fixed status and recording every call.
    struct MockTransport {
        status: u16,
        calls: Mutex<Vec<(ResourceKind, String, Value)>>,
    }

    impl MockTransport {
        fn returning(status: u16) -> Self {
            Self {
                status,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchServiceTransport for MockTransport {
        async fn put(
            &self,
            kind: ResourceKind,
            name: &str,
            body: &Value,
        ) -> Result<TransportResponse, ProvisionError> {
            self.calls
                .lock()
                .await
                .push((kind, name.to_string(), body.clone()));
            Ok(TransportResponse::new(self.status, "mock body"))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl SearchServiceTransport for FailingTransport {
        async fn put(
            &self,
            _kind: ResourceKind,
            _name: &str,
            _body: &Value,
        ) -> Result<TransportResponse, ProvisionError> {
            Err(ProvisionError::transport("connection refused"))
        }
    }

    fn data_source() -> DataSourceDefinition {
        DataSourceDefinition::new("ds1", "conn", "docs")
    }

    #[tokio::test]
    async fn test_put_created() {
        let transport = Arc::new(MockTransport::returning(201));
        let client = ResourceClient::new(transport.clone());

        let outcome = client.put(&data_source()).await.unwrap();
        assert_eq!(outcome, Outcome::Created);

        let calls = transport.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ResourceKind::DataSource);
        assert_eq!(calls[0].1, "ds1");
        assert_eq!(calls[0].2["container"]["name"], "docs");
    }

    #[tokio::test]
    async fn test_put_replaced() {
        let client = ResourceClient::new(Arc::new(MockTransport::returning(204)));
        assert_eq!(client.put(&data_source()).await.unwrap(), Outcome::Replaced(204));
    }

    #[tokio::test]
    async fn test_put_rejected() {
        let client = ResourceClient::new(Arc::new(MockTransport::returning(403)));

        let err = client.put(&data_source()).await.unwrap_err();
        match err {
            ProvisionError::RemoteRejection {
                kind,
                name,
                status,
                body,
            } => {
                assert_eq!(kind, ResourceKind::DataSource);
                assert_eq!(name, "ds1");
                assert_eq!(status, 403);
                assert_eq!(body, "mock body");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_put_transport_failure() {
        let client = ResourceClient::new(Arc::new(FailingTransport));
        let err = client.put(&data_source()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Transport(_)));
    }
}
