//! Indexer registration.

use tracing::instrument;

use search_provisioner_repository::{ProvisionError, ResourceClient};
use search_provisioner_shared::{
    FieldMapping, IndexerDefinition, IndexerParameters, IndexingSchedule, Outcome,
};

use crate::registrar::index_schema::field;

/// Declares the job that pulls documents from the data source through the
/// skillset into the index.
pub struct IndexerScheduler {
    client: ResourceClient,
    schedule: Option<IndexingSchedule>,
}

impl IndexerScheduler {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            schedule: None,
        }
    }

    /// Re-run the job on `schedule`. Without one it runs once per create or update.
    pub fn with_schedule(mut self, schedule: Option<IndexingSchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// The blob file name becomes the document title.
    pub fn storage_name_mapping() -> Vec<FieldMapping> {
        vec![FieldMapping::new("metadata_storage_name", field::TITLE)]
    }

    pub fn definition(
        &self,
        name: &str,
        source_ref: &str,
        pipeline_ref: &str,
        index_ref: &str,
        field_mappings: Vec<FieldMapping>,
        batch_parameters: IndexerParameters,
    ) -> IndexerDefinition {
        IndexerDefinition {
            name: name.to_string(),
            data_source_name: source_ref.to_string(),
            target_index_name: index_ref.to_string(),
            skillset_name: pipeline_ref.to_string(),
            disabled: None,
            schedule: self.schedule.clone(),
            parameters: batch_parameters,
            field_mappings,
            output_field_mappings: Vec::new(),
        }
    }

    /// Create or replace the indexer.
    ///
    /// The three references are not checked here. A job pointing at a missing
    /// resource is rejected by the service.
    #[instrument(skip(self, field_mappings, batch_parameters))]
    pub async fn ensure_job(
        &self,
        name: &str,
        source_ref: &str,
        pipeline_ref: &str,
        index_ref: &str,
        field_mappings: Vec<FieldMapping>,
        batch_parameters: IndexerParameters,
    ) -> Result<Outcome, ProvisionError> {
        let definition = self.definition(
            name,
            source_ref,
            pipeline_ref,
            index_ref,
            field_mappings,
            batch_parameters,
        );
        self.client.put(&definition).await
    }
}
