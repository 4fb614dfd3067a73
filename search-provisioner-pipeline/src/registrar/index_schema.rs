//! Index schema registration.
//!
//! The index is the sink for every branch of the skillset, so its field list
//! is a superset of what the projection writes: document-level metadata
//! (title, location, language) and chunk-level enrichments (entities, key
//! phrases, vector).

use tracing::instrument;

use search_provisioner_repository::{ProvisionError, ResourceClient};
use search_provisioner_shared::index::{
    AlgorithmKind, AzureOpenAiParameters, HnswParameters, PrioritizedFields,
    SemanticConfiguration, SemanticField, VectorAlgorithm, VectorProfile, Vectorizer,
    VectorizerKind,
};
use search_provisioner_shared::{
    FieldFlags, FieldSpec, FieldType, IndexDefinition, Outcome, SemanticSettings, VectorSearch,
};

use crate::settings::{EmbeddingSettings, PipelineSettings};

pub const VECTOR_ALGORITHM: &str = "vector-algorithm";
pub const VECTOR_PROFILE: &str = "vector-profile";
pub const VECTOR_VECTORIZER: &str = "vector-vectorizer";
pub const SEMANTIC_CONFIG: &str = "semantic-config";

/// Index field names.
pub mod field {
    pub const CHUNK_ID: &str = "chunk_id";
    pub const PARENT_ID: &str = "parent_id";
    pub const TITLE: &str = "title";
    pub const CHUNK: &str = "chunk";
    pub const LOCATION: &str = "location";
    pub const LANGUAGE: &str = "language";
    pub const PERSONS: &str = "persons";
    pub const URLS: &str = "urls";
    pub const EMAILS: &str = "emails";
    pub const KEY_PHRASES: &str = "key_phrases";
    pub const ORIGINAL_CHUNK: &str = "original_chunk";
    pub const METADATA_STORAGE_PATH: &str = "metadata_storage_path";
    pub const VECTOR: &str = "vector";
}

/// Field list of the chunk index, in declaration order.
pub fn chunk_index_fields(pipeline: &PipelineSettings, dimensions: u32) -> Vec<FieldSpec> {
    let analyzer = pipeline.analyzer();

    vec![
        FieldSpec::new(field::CHUNK_ID, FieldType::String, FieldFlags::ALL)
            .as_key()
            .with_analyzer("keyword"),
        FieldSpec::new(field::PARENT_ID, FieldType::String, FieldFlags::ALL),
        FieldSpec::new(field::TITLE, FieldType::String, FieldFlags::SEARCHABLE.filterable())
            .with_analyzer(&analyzer),
        FieldSpec::new(field::CHUNK, FieldType::String, FieldFlags::SEARCHABLE)
            .with_analyzer(&analyzer),
        FieldSpec::new(field::LOCATION, FieldType::String, FieldFlags::SEARCHABLE),
        FieldSpec::new(field::LANGUAGE, FieldType::String, FieldFlags::SEARCHABLE),
        FieldSpec::new(field::PERSONS, FieldType::StringCollection, FieldFlags::SEARCHABLE)
            .with_analyzer(&analyzer),
        FieldSpec::new(field::URLS, FieldType::StringCollection, FieldFlags::SEARCHABLE),
        FieldSpec::new(field::EMAILS, FieldType::StringCollection, FieldFlags::SEARCHABLE),
        FieldSpec::new(field::KEY_PHRASES, FieldType::StringCollection, FieldFlags::SEARCHABLE)
            .with_analyzer(&analyzer),
        FieldSpec::new(field::ORIGINAL_CHUNK, FieldType::String, FieldFlags::RETRIEVABLE),
        FieldSpec::new(
            field::METADATA_STORAGE_PATH,
            FieldType::String,
            FieldFlags::RETRIEVABLE,
        ),
        FieldSpec::vector(field::VECTOR, dimensions, VECTOR_PROFILE),
    ]
}

/// HNSW over cosine distance, vectorized at query time by the embedding deployment.
pub fn vector_search(embedding: &EmbeddingSettings) -> VectorSearch {
    VectorSearch {
        algorithms: vec![VectorAlgorithm {
            name: VECTOR_ALGORITHM.to_string(),
            kind: AlgorithmKind::Hnsw {
                parameters: HnswParameters::default(),
            },
        }],
        profiles: vec![VectorProfile {
            name: VECTOR_PROFILE.to_string(),
            algorithm: VECTOR_ALGORITHM.to_string(),
            vectorizer: VECTOR_VECTORIZER.to_string(),
        }],
        vectorizers: vec![Vectorizer {
            name: VECTOR_VECTORIZER.to_string(),
            kind: VectorizerKind::AzureOpenAi {
                parameters: AzureOpenAiParameters {
                    resource_uri: embedding.endpoint.clone(),
                    deployment_id: embedding.deployment_id.clone(),
                    api_key: embedding.api_key.clone(),
                    model_name: embedding.model_name.clone(),
                },
            },
        }],
    }
}

/// Semantic ranking over the title and the translated chunk text.
pub fn semantic_settings() -> SemanticSettings {
    SemanticSettings {
        configurations: vec![SemanticConfiguration {
            name: SEMANTIC_CONFIG.to_string(),
            prioritized_fields: PrioritizedFields {
                title_field: Some(SemanticField::new(field::TITLE)),
                prioritized_content_fields: vec![SemanticField::new(field::CHUNK)],
            },
        }],
    }
}

/// Declares the index schema.
pub struct IndexSchemaRegistrar {
    client: ResourceClient,
}

impl IndexSchemaRegistrar {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// Create or replace the index.
    ///
    /// Nothing is validated locally: key uniqueness, analyzer names and
    /// dimension limits are checked by the service and come back as a
    /// `RemoteRejection`.
    #[instrument(skip(self, fields, vector_config, semantic_config), fields(field_count = fields.len()))]
    pub async fn ensure_index(
        &self,
        name: &str,
        fields: Vec<FieldSpec>,
        vector_config: VectorSearch,
        semantic_config: SemanticSettings,
    ) -> Result<Outcome, ProvisionError> {
        let definition = IndexDefinition {
            name: name.to_string(),
            fields,
            semantic: semantic_config,
            vector_search: vector_config,
        };
        self.client.put(&definition).await
    }
}
