//! # Search Provisioner Shared
//!
//! Payload types for the four resources the provisioner declares against the
//! search service: data sources, indexes, skillsets and indexers.
//!
//! These are transient, in-process representations. They are serialized into
//! the body of a single PUT and dropped once the call returns; the remote
//! service owns the resource afterwards.

pub mod data_source;
pub mod expression;
pub mod index;
pub mod indexer;
pub mod resource;
pub mod skillset;

pub use data_source::{DataSourceDefinition, DataSourceType};
pub use expression::Expr;
pub use index::{
    DistanceMetric, FieldFlags, FieldSpec, FieldType, IndexDefinition, SemanticSettings,
    VectorSearch,
};
pub use indexer::{FieldMapping, IndexerDefinition, IndexerParameters, IndexingSchedule};
pub use resource::{Outcome, ResourceDefinition, ResourceDescriptor, ResourceKind};
pub use skillset::{
    CognitiveServices, IndexProjections, InputSource, ProjectionMapping, ProjectionMode,
    ProjectionSelector, Skill, SkillInput, SkillKind, SkillOutput, Skillset,
};
