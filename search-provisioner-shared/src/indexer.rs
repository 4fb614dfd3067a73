//! Indexer payload: the job binding data source, skillset and index.

use serde::Serialize;

use crate::resource::{ResourceDefinition, ResourceKind};

/// Run interval. Without one the indexer runs once when created or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexingSchedule {
    /// ISO-8601 duration, e.g. `PT2H`.
    pub interval: String,
}

impl IndexingSchedule {
    pub fn every(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
        }
    }
}

/// Blob parsing configuration for the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerConfiguration {
    pub data_to_extract: String,
    pub parsing_mode: String,
    pub excluded_file_name_extensions: String,
    pub image_action: String,
    pub allow_skillset_to_read_file_data: bool,
}

impl Default for IndexerConfiguration {
    fn default() -> Self {
        Self {
            data_to_extract: "contentAndMetadata".to_string(),
            parsing_mode: "default".to_string(),
            excluded_file_name_extensions: String::new(),
            image_action: "generateNormalizedImagePerPage".to_string(),
            allow_skillset_to_read_file_data: true,
        }
    }
}

/// Batch parameters. `None` leaves the service default in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerParameters {
    pub batch_size: Option<u32>,
    pub max_failed_items: Option<i32>,
    pub max_failed_items_per_batch: Option<i32>,
    pub base64_encode_keys: Option<bool>,
    pub configuration: IndexerConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingFunction {
    pub name: String,
}

/// Copies a raw document field straight into an index field, bypassing the skillset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field_name: String,
    pub target_field_name: String,
    pub mapping_function: Option<MappingFunction>,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_field_name: source.into(),
            target_field_name: target.into(),
            mapping_function: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerDefinition {
    pub name: String,
    pub data_source_name: String,
    pub target_index_name: String,
    pub skillset_name: String,
    pub disabled: Option<bool>,
    pub schedule: Option<IndexingSchedule>,
    pub parameters: IndexerParameters,
    pub field_mappings: Vec<FieldMapping>,
    pub output_field_mappings: Vec<FieldMapping>,
}

impl ResourceDefinition for IndexerDefinition {
    const KIND: ResourceKind = ResourceKind::Indexer;

    fn name(&self) -> &str {
        &self.name
    }
}
