//! Skillset payload: the enrichment graph and its projection into the index.
//!
//! A skill runs once per instance of its `context` path. It reads values from
//! the enrichment tree through its inputs and writes each output under
//! `{context}/{targetName}`, which later skills and projections can read.

use serde::{Serialize, Serializer};

use crate::expression::Expr;
use crate::resource::{ResourceDefinition, ResourceKind};

/// Where a skill input takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// A path in the enrichment tree, e.g. `/document/content`.
    Path(String),
    /// An inline expression, serialized as `= <expr>`.
    Expr(Expr),
}

impl InputSource {
    pub fn path(path: impl Into<String>) -> Self {
        InputSource::Path(path.into())
    }

    /// Paths this source reads.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            InputSource::Path(path) => vec![path.as_str()],
            InputSource::Expr(expr) => expr.field_refs(),
        }
    }
}

impl From<Expr> for InputSource {
    fn from(expr: Expr) -> Self {
        InputSource::Expr(expr)
    }
}

impl Serialize for InputSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputSource::Path(path) => serializer.serialize_str(path),
            InputSource::Expr(expr) => serializer.collect_str(&format_args!("= {}", expr)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInput {
    pub name: String,
    pub source: InputSource,
}

impl SkillInput {
    pub fn new(name: impl Into<String>, source: impl Into<InputSource>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

impl From<&str> for InputSource {
    fn from(path: &str) -> Self {
        InputSource::Path(path.to_string())
    }
}

impl From<String> for InputSource {
    fn from(path: String) -> Self {
        InputSource::Path(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutput {
    pub name: String,
    pub target_name: String,
}

impl SkillOutput {
    pub fn new(name: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_name: target_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineEnding {
    Space,
    CarriageReturn,
    LineFeed,
    CarriageReturnLineFeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextSplitMode {
    Pages,
    Sentences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityCategory {
    Person,
    Location,
    Organization,
    #[serde(rename = "URL")]
    Url,
    Email,
}

/// Skill type and its type-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@odata.type")]
pub enum SkillKind {
    #[serde(
        rename = "#Microsoft.Skills.Text.LanguageDetectionSkill",
        rename_all = "camelCase"
    )]
    LanguageDetection {
        default_country_hint: Option<String>,
        model_version: Option<String>,
    },

    #[serde(rename = "#Microsoft.Skills.Vision.OcrSkill", rename_all = "camelCase")]
    Ocr {
        text_extraction_algorithm: Option<String>,
        line_ending: LineEnding,
        default_language_code: String,
        detect_orientation: bool,
    },

    #[serde(rename = "#Microsoft.Skills.Text.MergeSkill", rename_all = "camelCase")]
    Merge {
        insert_pre_tag: String,
        insert_post_tag: String,
    },

    /// Selects `whenTrue` or `whenFalse` based on `condition`.
    #[serde(rename = "#Microsoft.Skills.Util.ConditionalSkill")]
    Conditional,

    #[serde(rename = "#Microsoft.Skills.Text.SplitSkill", rename_all = "camelCase")]
    Split {
        default_language_code: String,
        text_split_mode: TextSplitMode,
        maximum_page_length: u32,
        page_overlap_length: u32,
        maximum_pages_to_take: u32,
    },

    #[serde(
        rename = "#Microsoft.Skills.Text.TranslationSkill",
        rename_all = "camelCase"
    )]
    Translation {
        default_from_language_code: String,
        default_to_language_code: String,
        suggested_from: String,
    },

    #[serde(
        rename = "#Microsoft.Skills.Text.V3.EntityRecognitionSkill",
        rename_all = "camelCase"
    )]
    EntityRecognition {
        categories: Vec<EntityCategory>,
        default_language_code: String,
        minimum_precision: f64,
        model_version: Option<String>,
    },

    #[serde(
        rename = "#Microsoft.Skills.Text.KeyPhraseExtractionSkill",
        rename_all = "camelCase"
    )]
    KeyPhraseExtraction {
        default_language_code: String,
        max_key_phrase_count: Option<u32>,
        model_version: Option<String>,
    },

    #[serde(
        rename = "#Microsoft.Skills.Text.AzureOpenAIEmbeddingSkill",
        rename_all = "camelCase"
    )]
    Embedding {
        resource_uri: String,
        api_key: String,
        deployment_id: String,
        dimensions: u32,
        model_name: String,
    },
}

impl SkillKind {
    pub fn label(&self) -> &'static str {
        match self {
            SkillKind::LanguageDetection { .. } => "language-detect",
            SkillKind::Ocr { .. } => "ocr",
            SkillKind::Merge { .. } => "merge",
            SkillKind::Conditional => "conditional",
            SkillKind::Split { .. } => "split",
            SkillKind::Translation { .. } => "translate",
            SkillKind::EntityRecognition { .. } => "entity-extraction",
            SkillKind::KeyPhraseExtraction { .. } => "key-phrase-extraction",
            SkillKind::Embedding { .. } => "embedding",
        }
    }
}

/// One step of the enrichment graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skill {
    pub name: String,
    pub description: Option<String>,
    pub context: String,
    #[serde(flatten)]
    pub kind: SkillKind,
    pub inputs: Vec<SkillInput>,
    pub outputs: Vec<SkillOutput>,
}

impl Skill {
    pub fn new(name: impl Into<String>, context: impl Into<String>, kind: SkillKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            context: context.into(),
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input(mut self, name: impl Into<String>, source: impl Into<InputSource>) -> Self {
        self.inputs.push(SkillInput::new(name, source));
        self
    }

    pub fn output(mut self, name: impl Into<String>, target_name: impl Into<String>) -> Self {
        self.outputs.push(SkillOutput::new(name, target_name));
        self
    }

    pub fn input_source(&self, name: &str) -> Option<&InputSource> {
        self.inputs.iter().find(|i| i.name == name).map(|i| &i.source)
    }

    /// Full path an output is written to.
    pub fn target_path(&self, output: &SkillOutput) -> String {
        format!("{}/{}", self.context, output.target_name)
    }

    pub fn target_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.outputs.iter().map(|o| self.target_path(o))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@odata.type")]
pub enum CognitiveServices {
    #[serde(rename = "#Microsoft.Azure.Search.CognitiveServicesByKey")]
    ByKey {
        description: Option<String>,
        key: String,
    },
}

/// Maps an enrichment path to a field of the child record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionMapping {
    pub name: String,
    pub source: String,
    pub source_context: Option<String>,
    pub inputs: Vec<SkillInput>,
}

impl ProjectionMapping {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            source_context: None,
            inputs: Vec::new(),
        }
    }
}

/// Projects one record per instance of `source_context` into the target index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSelector {
    pub target_index_name: String,
    pub parent_key_field_name: String,
    pub source_context: String,
    pub mappings: Vec<ProjectionMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionMode {
    SkipIndexingParentDocuments,
    IncludeIndexingParentDocuments,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParameters {
    pub projection_mode: ProjectionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexProjections {
    pub selectors: Vec<ProjectionSelector>,
    pub parameters: ProjectionParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skillset {
    pub name: String,
    pub description: Option<String>,
    pub skills: Vec<Skill>,
    pub cognitive_services: CognitiveServices,
    pub index_projections: IndexProjections,
}

impl Skillset {
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }
}

impl ResourceDefinition for Skillset {
    const KIND: ResourceKind = ResourceKind::Skillset;

    fn name(&self) -> &str {
        &self.name
    }
}
