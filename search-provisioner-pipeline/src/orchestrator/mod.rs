//! Provisioning driver.
//!
//! Runs the four registrars in dependency order: data source, index,
//! skillset, indexer. A failed step is recorded and the driver moves on, so
//! a single run can leave some resources created and others not. Re-running
//! converges because every step is a create-or-replace.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use search_provisioner_repository::ProvisionError;
use search_provisioner_shared::{FieldMapping, IndexerParameters, Outcome, ResourceKind};

use crate::registrar::index_schema::{chunk_index_fields, semantic_settings, vector_search};
use crate::registrar::{DataSourceRegistrar, IndexSchemaRegistrar, IndexerScheduler, PipelineDefiner};
use crate::settings::EmbeddingSettings;

/// Whether a resource still needs to be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupFlag {
    #[default]
    Pending,
    Done,
}

impl SetupFlag {
    /// Read an `IS_*_SETUP` value.
    ///
    /// Only the literal string `false` (or no value at all) means the resource
    /// still has to be set up. Anything else, including `False`, `0` or a
    /// typo, counts as already done. This matches how existing deployments
    /// set these flags and is kept deliberately.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None | Some("false") => SetupFlag::Pending,
            Some(_) => SetupFlag::Done,
        }
    }

    pub fn is_done(self) -> bool {
        self == SetupFlag::Done
    }
}

#[derive(Clone)]
pub struct DataSourceStep {
    pub name: String,
    pub connection_string: String,
    pub container: String,
    pub setup: SetupFlag,
}

#[derive(Clone)]
pub struct IndexStep {
    pub name: String,
    pub setup: SetupFlag,
}

#[derive(Clone)]
pub struct SkillsetStep {
    pub name: String,
    pub cognitive_key: String,
    pub setup: SetupFlag,
}

#[derive(Clone)]
pub struct IndexerStep {
    pub name: String,
    pub field_mappings: Vec<FieldMapping>,
    pub parameters: IndexerParameters,
    pub setup: SetupFlag,
}

/// Everything one run declares. Carries secrets, so it has no `Debug`.
#[derive(Clone)]
pub struct ProvisionPlan {
    pub data_source: DataSourceStep,
    pub index: IndexStep,
    pub skillset: SkillsetStep,
    pub indexer: IndexerStep,
    /// Shared by the skillset embedding skill and the index vectorizer.
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Created,
    Replaced,
    Skipped,
    Failed(String),
}

impl StepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub kind: ResourceKind,
    pub name: String,
    pub status: StepStatus,
    /// HTTP status of the PUT, when one was issued and is known.
    pub http_status: Option<u16>,
}

impl StepReport {
    fn skipped(kind: ResourceKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            status: StepStatus::Skipped,
            http_status: None,
        }
    }

    fn completed(kind: ResourceKind, name: &str, result: Result<Outcome, ProvisionError>) -> Self {
        let (status, http_status) = match result {
            Ok(outcome @ Outcome::Created) => (StepStatus::Created, Some(outcome.status())),
            Ok(outcome @ Outcome::Replaced(_)) => (StepStatus::Replaced, Some(outcome.status())),
            Err(e) => (StepStatus::Failed(e.to_string()), e.status()),
        };
        Self {
            kind,
            name: name.to_string(),
            status,
            http_status,
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': ", self.kind.label(), self.name)?;
        match &self.status {
            StepStatus::Created => f.write_str("created"),
            StepStatus::Replaced => f.write_str("replaced"),
            StepStatus::Skipped => f.write_str("skipped (already set up)"),
            StepStatus::Failed(message) => match self.http_status {
                Some(code) => write!(f, "failed with status code {}: {}", code, message),
                None => write!(f, "failed: {}", message),
            },
        }
    }
}

/// Outcome of one driver run, one entry per resource in execution order.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    pub fn step(&self, kind: ResourceKind) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.status.is_failure())
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        let elapsed = self.finished_at - self.started_at;
        write!(
            f,
            "{} of {} steps failed ({} ms)",
            self.failures().count(),
            self.steps.len(),
            elapsed.num_milliseconds()
        )
    }
}

/// Drives the four registrars.
pub struct Orchestrator {
    data_sources: DataSourceRegistrar,
    indexes: IndexSchemaRegistrar,
    pipelines: PipelineDefiner,
    scheduler: IndexerScheduler,
}

impl Orchestrator {
    pub fn new(
        data_sources: DataSourceRegistrar,
        indexes: IndexSchemaRegistrar,
        pipelines: PipelineDefiner,
        scheduler: IndexerScheduler,
    ) -> Self {
        Self {
            data_sources,
            indexes,
            pipelines,
            scheduler,
        }
    }

    /// Declare every pending resource, one after another.
    ///
    /// Never fails as a whole: per-resource errors end up in the report.
    #[instrument(skip_all)]
    pub async fn run(&self, plan: &ProvisionPlan) -> ProvisionReport {
        info!("Starting provisioning run");
        let started_at = Utc::now();
        let mut steps = Vec::with_capacity(ResourceKind::ALL.len());

        let ds = &plan.data_source;
        steps.push(
            step(
                ResourceKind::DataSource,
                &ds.name,
                ds.setup,
                self.data_sources
                    .ensure_data_source(&ds.name, &ds.connection_string, &ds.container),
            )
            .await,
        );

        let fields = chunk_index_fields(self.pipelines.settings(), plan.embedding.dimensions);
        steps.push(
            step(
                ResourceKind::Index,
                &plan.index.name,
                plan.index.setup,
                self.indexes.ensure_index(
                    &plan.index.name,
                    fields,
                    vector_search(&plan.embedding),
                    semantic_settings(),
                ),
            )
            .await,
        );

        let skillset = &plan.skillset;
        steps.push(
            step(
                ResourceKind::Skillset,
                &skillset.name,
                skillset.setup,
                self.pipelines.ensure_pipeline(
                    &skillset.name,
                    &plan.index.name,
                    &plan.embedding,
                    &skillset.cognitive_key,
                ),
            )
            .await,
        );

        let job = &plan.indexer;
        steps.push(
            step(
                ResourceKind::Indexer,
                &job.name,
                job.setup,
                self.scheduler.ensure_job(
                    &job.name,
                    &ds.name,
                    &skillset.name,
                    &plan.index.name,
                    job.field_mappings.clone(),
                    job.parameters.clone(),
                ),
            )
            .await,
        );

        let report = ProvisionReport {
            started_at,
            finished_at: Utc::now(),
            steps,
        };
        info!(
            failed = report.failures().count(),
            "Provisioning run complete"
        );
        report
    }
}

/// Await `operation` unless the resource is already set up. The future is
/// lazy, so a skipped step issues no request.
async fn step<F>(kind: ResourceKind, name: &str, setup: SetupFlag, operation: F) -> StepReport
where
    F: Future<Output = Result<Outcome, ProvisionError>>,
{
    if setup.is_done() {
        info!(resource = %kind, name = %name, "Already set up, skipping");
        return StepReport::skipped(kind, name);
    }

    let result = operation.await;
    match &result {
        Ok(outcome) => info!(resource = %kind, name = %name, outcome = %outcome, "Resource declared"),
        Err(e) => error!(
            resource = %kind,
            name = %name,
            status = ?e.status(),
            error = %e,
            "Resource declaration failed"
        ),
    }
    StepReport::completed(kind, name, result)
}
