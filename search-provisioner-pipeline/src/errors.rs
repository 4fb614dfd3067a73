//! Error types for skillset definition.

use thiserror::Error;

use search_provisioner_repository::ProvisionError;

/// A skill graph that would be rejected by the service, caught locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Skill '{0}' is declared more than once")]
    DuplicateSkill(String),

    #[error("Skill '{skill}' runs in unknown context {context}")]
    UnknownContext { skill: String, context: String },

    #[error("Skill '{skill}' reads {path} before anything produces it")]
    DanglingSource { skill: String, path: String },

    #[error("Skill '{skill}' in context {context} reads {path} from an unrelated fan-out")]
    ContextMismatch {
        skill: String,
        context: String,
        path: String,
    },

    #[error("Skill '{skill}' writes {target}, which is already produced")]
    DuplicateTarget { skill: String, target: String },

    #[error("Conditional skill '{0}' needs condition, whenTrue and whenFalse inputs")]
    MalformedConditional(String),

    #[error("Projection into '{index}' uses unknown source context {context}")]
    UnknownProjectionContext { index: String, context: String },

    #[error("Projection field '{field}' reads unknown path {path}")]
    UnknownProjectionSource { field: String, path: String },

    #[error("Skillset '{0}' has no cognitive services account")]
    MissingCognitiveServices(String),
}

impl From<DefinitionError> for ProvisionError {
    fn from(err: DefinitionError) -> Self {
        ProvisionError::invalid_definition(err.to_string())
    }
}
