//! Recording transport shared by the unit tests of this crate.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use search_provisioner_repository::{ProvisionError, SearchServiceTransport, TransportResponse};
use search_provisioner_shared::{ResourceDescriptor, ResourceKind};

/// Records every PUT and answers from a script, falling back to a default status.
pub struct RecordingTransport {
    default_status: u16,
    script: Mutex<VecDeque<u16>>,
    calls: Mutex<Vec<(ResourceKind, String, Value)>>,
}

impl RecordingTransport {
    pub fn returning(status: u16) -> Self {
        Self::scripted(status, [])
    }

    pub fn scripted(default_status: u16, script: impl IntoIterator<Item = u16>) -> Self {
        Self {
            default_status,
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<(ResourceKind, String, Value)> {
        self.calls.lock().await.clone()
    }

    /// Last payload per resource, as a replace-on-PUT service would hold it.
    pub async fn state(&self) -> BTreeMap<ResourceDescriptor, Value> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(kind, name, body)| (ResourceDescriptor::new(*kind, name.clone()), body.clone()))
            .collect()
    }
}

#[async_trait]
impl SearchServiceTransport for RecordingTransport {
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
        let status = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(self.default_status);
        Ok(TransportResponse::new(status, format!("status {}", status)))
    }
}
