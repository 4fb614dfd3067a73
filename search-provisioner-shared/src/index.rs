//! Index schema payload: fields, vector search and semantic ranking.

use serde::Serialize;

use crate::resource::{ResourceDefinition, ResourceKind};

/// Data type of an index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Collection(Edm.String)")]
    StringCollection,
    #[serde(rename = "Collection(Edm.Single)")]
    SingleCollection,
}

/// Per-field attribute switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FieldFlags {
    pub searchable: bool,
    pub retrievable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub facetable: bool,
}

impl FieldFlags {
    /// Stored and returned, nothing else.
    pub const RETRIEVABLE: FieldFlags = FieldFlags {
        searchable: false,
        retrievable: true,
        filterable: false,
        sortable: false,
        facetable: false,
    };

    /// Full-text searchable and returned.
    pub const SEARCHABLE: FieldFlags = FieldFlags {
        searchable: true,
        retrievable: true,
        filterable: false,
        sortable: false,
        facetable: false,
    };

    /// Every switch on.
    pub const ALL: FieldFlags = FieldFlags {
        searchable: true,
        retrievable: true,
        filterable: true,
        sortable: true,
        facetable: true,
    };

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }
}

/// A single field of the index schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: FieldType,
    pub key: bool,
    #[serde(flatten)]
    pub flags: FieldFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_profile: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, data_type: FieldType, flags: FieldFlags) -> Self {
        Self {
            name: name.into(),
            data_type,
            key: false,
            flags,
            analyzer: None,
            dimensions: None,
            vector_search_profile: None,
        }
    }

    /// A vector field bound to a vector search profile.
    pub fn vector(name: impl Into<String>, dimensions: u32, profile: impl Into<String>) -> Self {
        Self {
            dimensions: Some(dimensions),
            vector_search_profile: Some(profile.into()),
            ..Self::new(name, FieldType::SingleCollection, FieldFlags::SEARCHABLE)
        }
    }

    pub fn as_key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
    DotProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HnswParameters {
    pub metric: DistanceMetric,
    pub m: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
}

impl Default for HnswParameters {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Cosine,
            m: 4,
            ef_construction: 400,
            ef_search: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhaustiveKnnParameters {
    pub metric: DistanceMetric,
}

/// Search algorithm and its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum AlgorithmKind {
    #[serde(rename = "hnsw")]
    Hnsw {
        #[serde(rename = "hnswParameters")]
        parameters: HnswParameters,
    },
    #[serde(rename = "exhaustiveKnn")]
    ExhaustiveKnn {
        #[serde(rename = "exhaustiveKnnParameters")]
        parameters: ExhaustiveKnnParameters,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorAlgorithm {
    pub name: String,
    #[serde(flatten)]
    pub kind: AlgorithmKind,
}

/// Binds an algorithm to a vectorizer under a name fields can reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorProfile {
    pub name: String,
    pub algorithm: String,
    pub vectorizer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOpenAiParameters {
    pub resource_uri: String,
    pub deployment_id: String,
    pub api_key: String,
    pub model_name: String,
}

/// Query-time embedding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum VectorizerKind {
    #[serde(rename = "azureOpenAI")]
    AzureOpenAi {
        #[serde(rename = "azureOpenAIParameters")]
        parameters: AzureOpenAiParameters,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vectorizer {
    pub name: String,
    #[serde(flatten)]
    pub kind: VectorizerKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VectorSearch {
    pub algorithms: Vec<VectorAlgorithm>,
    pub profiles: Vec<VectorProfile>,
    pub vectorizers: Vec<Vectorizer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticField {
    pub field_name: String,
}

impl SemanticField {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_field: Option<SemanticField>,
    pub prioritized_content_fields: Vec<SemanticField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticConfiguration {
    pub name: String,
    pub prioritized_fields: PrioritizedFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SemanticSettings {
    pub configurations: Vec<SemanticConfiguration>,
}

/// The full index schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub semantic: SemanticSettings,
    pub vector_search: VectorSearch,
}

impl IndexDefinition {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn key_fields(&self) -> Vec<&FieldSpec> {
        self.fields.iter().filter(|f| f.key).collect()
    }

    /// Profiles referenced by fields, or declared by profiles, that do not
    /// resolve to a declared profile, algorithm and vectorizer.
    pub fn unresolved_profiles(&self) -> Vec<String> {
        let vs = &self.vector_search;
        let mut unresolved = Vec::new();

        for field in &self.fields {
            if let Some(profile) = &field.vector_search_profile {
                if !vs.profiles.iter().any(|p| &p.name == profile) {
                    unresolved.push(profile.clone());
                }
            }
        }

        for profile in &vs.profiles {
            let algorithm_ok = vs.algorithms.iter().any(|a| a.name == profile.algorithm);
            let vectorizer_ok = vs.vectorizers.iter().any(|v| v.name == profile.vectorizer);
            if !algorithm_ok || !vectorizer_ok {
                unresolved.push(profile.name.clone());
            }
        }

        unresolved
    }
}

impl ResourceDefinition for IndexDefinition {
    const KIND: ResourceKind = ResourceKind::Index;

    fn name(&self) -> &str {
        &self.name
    }
}
