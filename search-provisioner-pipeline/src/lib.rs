//! # Search Provisioner Pipeline
//!
//! This crate declares the resources that make a blob container searchable
//! and drives their creation.
//!
//! ## Architecture
//!
//! Four registrars, declared in dependency order by the orchestrator:
//!
//! 1. **DataSourceRegistrar**: binds the blob container
//! 2. **IndexSchemaRegistrar**: fields, vector search and semantic ranking
//! 3. **PipelineDefiner**: the bilingual chunking and enrichment skillset
//! 4. **IndexerScheduler**: the job tying the other three together
//!
//! The skillset is assembled with the `graph` builder, which rejects
//! dangling path references before anything is sent.

pub mod errors;
pub mod graph;
pub mod orchestrator;
pub mod registrar;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use errors::DefinitionError;
pub use orchestrator::{
    DataSourceStep, IndexStep, IndexerStep, Orchestrator, ProvisionPlan, ProvisionReport,
    SetupFlag, SkillsetStep, StepReport, StepStatus,
};
pub use registrar::{DataSourceRegistrar, IndexSchemaRegistrar, IndexerScheduler, PipelineDefiner};
pub use settings::{EmbeddingSettings, PipelineSettings};
