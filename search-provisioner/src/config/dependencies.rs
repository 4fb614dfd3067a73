//! Dependency initialization and wiring for the provisioner.

use std::sync::Arc;
use tracing::info;

use search_provisioner_pipeline::{
    DataSourceRegistrar, IndexSchemaRegistrar, IndexerScheduler, Orchestrator, PipelineDefiner,
    ProvisionPlan,
};
use search_provisioner_repository::{
    AzureSearchTransport, ResourceClient, SearchServiceTransport, TransportConfig,
};

use crate::config::ProvisionerConfig;
use crate::SetupError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// What the orchestrator should declare.
    pub plan: ProvisionPlan,
}

impl Dependencies {
    /// Build the Azure AI Search transport and wire every registrar to it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(SetupError)` - If the endpoint is unusable or the HTTP client fails to build
    pub fn new(config: &ProvisionerConfig) -> Result<Self, SetupError> {
        info!(
            endpoint = %config.search_endpoint,
            data_source = %config.names.data_source,
            index = %config.names.index,
            skillset = %config.names.skillset,
            indexer = %config.names.indexer,
            "Initializing dependencies"
        );

        let mut transport_config =
            TransportConfig::default().with_api_version(config.api_version.clone());
        if let Some(timeout) = config.http_timeout {
            transport_config = transport_config.with_timeout(timeout);
        }

        let transport = AzureSearchTransport::new(
            &config.search_endpoint,
            config.search_key.clone(),
            transport_config,
        )?;

        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Wire the registrars to an arbitrary transport.
    pub fn with_transport(
        config: &ProvisionerConfig,
        transport: Arc<dyn SearchServiceTransport>,
    ) -> Self {
        let client = ResourceClient::new(transport);

        let orchestrator = Orchestrator::new(
            DataSourceRegistrar::new(client.clone()).with_source_type(config.storage_kind),
            IndexSchemaRegistrar::new(client.clone()),
            PipelineDefiner::new(client.clone(), config.pipeline.clone()),
            IndexerScheduler::new(client).with_schedule(config.schedule.clone()),
        );

        Self {
            orchestrator,
            plan: config.plan(),
        }
    }
}
