//! Registrars: one per resource kind, each with an idempotent ensure operation.
//!
//! Every ensure operation is a single create-or-replace PUT. Running it twice
//! with the same arguments leaves the service in the same state as once.

mod data_source;
pub mod index_schema;
mod indexer_scheduler;
pub mod pipeline_definer;

pub use data_source::DataSourceRegistrar;
pub use index_schema::IndexSchemaRegistrar;
pub use indexer_scheduler::IndexerScheduler;
pub use pipeline_definer::PipelineDefiner;
