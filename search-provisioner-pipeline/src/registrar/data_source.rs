//! Data source registration.

use tracing::instrument;

use search_provisioner_repository::{ProvisionError, ResourceClient};
use search_provisioner_shared::{DataSourceDefinition, DataSourceType, Outcome};

const DESCRIPTION: &str = "Blob container holding the documents to index.";

/// Declares the blob container as a searchable data source.
pub struct DataSourceRegistrar {
    client: ResourceClient,
    source_type: DataSourceType,
}

impl DataSourceRegistrar {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            source_type: DataSourceType::default(),
        }
    }

    pub fn with_source_type(mut self, source_type: DataSourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn definition(
        &self,
        name: &str,
        connection_secret: &str,
        container_name: &str,
    ) -> DataSourceDefinition {
        DataSourceDefinition::new(name, connection_secret, container_name)
            .with_type(self.source_type)
            .with_description(DESCRIPTION)
    }

    /// Create or replace the data source.
    ///
    /// The connection secret must grant read access to `container_name`; the
    /// service checks that, not this call.
    #[instrument(skip(self, connection_secret))]
    pub async fn ensure_data_source(
        &self,
        name: &str,
        connection_secret: &str,
        container_name: &str,
    ) -> Result<Outcome, ProvisionError> {
        let definition = self.definition(name, connection_secret, container_name);
        self.client.put(&definition).await
    }
}
