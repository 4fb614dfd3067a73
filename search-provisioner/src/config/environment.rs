//! Process configuration read from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use search_provisioner_pipeline::{
    DataSourceStep, EmbeddingSettings, IndexStep, IndexerScheduler, IndexerStep, PipelineSettings,
    ProvisionPlan, SetupFlag, SkillsetStep,
};
use search_provisioner_repository::config::DEFAULT_API_VERSION;
use search_provisioner_shared::{DataSourceType, IndexerParameters, IndexingSchedule};

use crate::ConfigError;

const DEFAULT_DATASOURCE_NAME: &str = "test-datasource";
const DEFAULT_INDEX_NAME: &str = "test-index";
const DEFAULT_SKILLSET_NAME: &str = "test-skillset";
const DEFAULT_INDEXER_NAME: &str = "test-indexer";

/// Names of the four resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub data_source: String,
    pub index: String,
    pub skillset: String,
    pub indexer: String,
}

/// Per-resource "already set up" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupFlags {
    pub data_source: SetupFlag,
    pub index: SetupFlag,
    pub skillset: SetupFlag,
    pub indexer: SetupFlag,
}

/// Everything the provisioner reads from its environment, loaded once at startup.
#[derive(Clone)]
pub struct ProvisionerConfig {
    pub search_endpoint: String,
    pub search_key: String,
    pub api_version: String,
    pub http_timeout: Option<Duration>,
    pub storage_connection_string: String,
    pub storage_container: String,
    pub storage_kind: DataSourceType,
    pub embedding: EmbeddingSettings,
    pub aiservices_key: String,
    pub pipeline: PipelineSettings,
    pub names: ResourceNames,
    pub setup: SetupFlags,
    pub schedule: Option<IndexingSchedule>,
    pub indexer_parameters: IndexerParameters,
}

impl ProvisionerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`
    /// - `AZURE_STORAGE_CONNECTION_STRING`, `AZURE_STORAGE_CONTAINER_NAME`
    /// - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_KEY`, `AZURE_OPENAI_EMBEDDING_MODEL`
    /// - `AZURE_AISERVICES_KEY`
    ///
    /// Optional:
    /// - `DATASOURCE_NAME`, `INDEX_NAME`, `SKILL_SET_NAME`, `INDEXER_NAME`
    /// - `IS_DATASOURCE_SETUP`, `IS_DOC_INDEX_SETUP`, `IS_SKILLSET_SETUP`, `IS_INDEXER_SETUP`
    /// - `AZURE_SEARCH_API_VERSION` (default: 2024-07-01), `HTTP_TIMEOUT_SECS`
    /// - `AZURE_STORAGE_KIND` (default: adlsgen2)
    /// - `AZURE_OPENAI_EMBEDDING_DEPLOYMENT` (default: embedding),
    ///   `AZURE_OPENAI_EMBEDDING_DIMENSIONS` (default: 3072)
    /// - `PIPELINE_TARGET_LANGUAGE` (default: ja), `PIPELINE_SOURCE_LANGUAGE` (default: en),
    ///   `PIPELINE_PAGE_LENGTH` (default: 2000), `PIPELINE_PAGE_OVERLAP` (default: 500)
    /// - `INDEXER_SCHEDULE_INTERVAL`, `INDEXER_BATCH_SIZE`, `INDEXER_MAX_FAILED_ITEMS`,
    ///   `INDEXER_MAX_FAILED_ITEMS_PER_BATCH`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let storage_kind = match vars.optional("AZURE_STORAGE_KIND")? {
            Some(kind) => DataSourceType::from_str(&kind)
                .map_err(|e| ConfigError::invalid("AZURE_STORAGE_KIND", e))?,
            None => DataSourceType::default(),
        };

        let mut embedding = EmbeddingSettings::new(
            vars.required("AZURE_OPENAI_ENDPOINT")?,
            vars.required("AZURE_OPENAI_KEY")?,
            vars.required("AZURE_OPENAI_EMBEDDING_MODEL")?,
        );
        if let Some(deployment) = vars.optional("AZURE_OPENAI_EMBEDDING_DEPLOYMENT")? {
            embedding.deployment_id = deployment;
        }
        if let Some(dimensions) = vars.parsed("AZURE_OPENAI_EMBEDDING_DIMENSIONS")? {
            embedding.dimensions = dimensions;
        }

        let defaults = PipelineSettings::default();
        let pipeline = PipelineSettings {
            target_language: vars
                .optional("PIPELINE_TARGET_LANGUAGE")?
                .unwrap_or(defaults.target_language),
            source_language: vars
                .optional("PIPELINE_SOURCE_LANGUAGE")?
                .unwrap_or(defaults.source_language),
            page_length: vars
                .parsed("PIPELINE_PAGE_LENGTH")?
                .unwrap_or(defaults.page_length),
            page_overlap: vars
                .parsed("PIPELINE_PAGE_OVERLAP")?
                .unwrap_or(defaults.page_overlap),
        };
        if pipeline.page_overlap >= pipeline.page_length {
            return Err(ConfigError::invalid(
                "PIPELINE_PAGE_OVERLAP",
                "must be smaller than PIPELINE_PAGE_LENGTH",
            ));
        }

        Ok(Self {
            search_endpoint: vars.required("AZURE_SEARCH_ENDPOINT")?,
            search_key: vars.required("AZURE_SEARCH_KEY")?,
            api_version: vars
                .optional("AZURE_SEARCH_API_VERSION")?
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            http_timeout: vars.parsed("HTTP_TIMEOUT_SECS")?.map(Duration::from_secs),
            storage_connection_string: vars.required("AZURE_STORAGE_CONNECTION_STRING")?,
            storage_container: vars.required("AZURE_STORAGE_CONTAINER_NAME")?,
            storage_kind,
            embedding,
            aiservices_key: vars.required("AZURE_AISERVICES_KEY")?,
            pipeline,
            names: ResourceNames {
                data_source: vars.or_default("DATASOURCE_NAME", DEFAULT_DATASOURCE_NAME)?,
                index: vars.or_default("INDEX_NAME", DEFAULT_INDEX_NAME)?,
                skillset: vars.or_default("SKILL_SET_NAME", DEFAULT_SKILLSET_NAME)?,
                indexer: vars.or_default("INDEXER_NAME", DEFAULT_INDEXER_NAME)?,
            },
            setup: SetupFlags {
                data_source: vars.flag("IS_DATASOURCE_SETUP"),
                index: vars.flag("IS_DOC_INDEX_SETUP"),
                skillset: vars.flag("IS_SKILLSET_SETUP"),
                indexer: vars.flag("IS_INDEXER_SETUP"),
            },
            schedule: vars
                .optional("INDEXER_SCHEDULE_INTERVAL")?
                .map(IndexingSchedule::every),
            indexer_parameters: IndexerParameters {
                batch_size: vars.parsed("INDEXER_BATCH_SIZE")?,
                max_failed_items: vars.parsed("INDEXER_MAX_FAILED_ITEMS")?,
                max_failed_items_per_batch: vars.parsed("INDEXER_MAX_FAILED_ITEMS_PER_BATCH")?,
                ..Default::default()
            },
        })
    }

    /// The run this configuration describes.
    pub fn plan(&self) -> ProvisionPlan {
        ProvisionPlan {
            data_source: DataSourceStep {
                name: self.names.data_source.clone(),
                connection_string: self.storage_connection_string.clone(),
                container: self.storage_container.clone(),
                setup: self.setup.data_source,
            },
            index: IndexStep {
                name: self.names.index.clone(),
                setup: self.setup.index,
            },
            skillset: SkillsetStep {
                name: self.names.skillset.clone(),
                cognitive_key: self.aiservices_key.clone(),
                setup: self.setup.skillset,
            },
            indexer: IndexerStep {
                name: self.names.indexer.clone(),
                field_mappings: IndexerScheduler::storage_name_mapping(),
                parameters: self.indexer_parameters.clone(),
                setup: self.setup.indexer,
            },
            embedding: self.embedding.clone(),
        }
    }
}

impl fmt::Debug for ProvisionerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerConfig")
            .field("search_endpoint", &self.search_endpoint)
            .field("search_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("http_timeout", &self.http_timeout)
            .field("storage_connection_string", &"<redacted>")
            .field("storage_container", &self.storage_container)
            .field("storage_kind", &self.storage_kind)
            .field("embedding_endpoint", &self.embedding.endpoint)
            .field("embedding_model", &self.embedding.model_name)
            .field("aiservices_key", &"<redacted>")
            .field("pipeline", &self.pipeline)
            .field("names", &self.names)
            .field("setup", &self.setup)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, var: &str) -> Result<String, ConfigError> {
        match (self.lookup)(var) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::missing(var)),
        }
    }

    /// Unset means `None`. Set but blank is an error.
    fn optional(&self, var: &str) -> Result<Option<String>, ConfigError> {
        match (self.lookup)(var) {
            Some(value) if value.trim().is_empty() => {
                Err(ConfigError::invalid(var, "value is blank"))
            }
            other => Ok(other),
        }
    }

    fn parsed<T>(&self, var: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(var)?
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::invalid(var, format!("{}: {}", value, e)))
            })
            .transpose()
    }

    fn or_default(&self, var: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .optional(var)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn flag(&self, var: &str) -> SetupFlag {
        SetupFlag::from_env_value((self.lookup)(var).as_deref())
    }
}
