//! Skillset builder with local reference validation.

use std::collections::BTreeSet;

use search_provisioner_shared::{
    skillset::ProjectionParameters, CognitiveServices, IndexProjections, ProjectionMode,
    ProjectionSelector, Skill, SkillKind, Skillset,
};

use crate::errors::DefinitionError;
use crate::graph::paths::{self, WILDCARD};

/// Inputs a conditional skill must declare.
const CONDITIONAL_INPUTS: [&str; 3] = ["condition", "whenTrue", "whenFalse"];

/// Assembles a `Skillset` and validates its data dependencies.
///
/// A skill may read a raw document field or any path produced by a skill
/// declared before it, as long as the path is not under a fan-out unrelated
/// to the skill's context. Projections may read anything produced by the graph.
#[derive(Debug, Clone)]
pub struct SkillsetBuilder {
    name: String,
    description: Option<String>,
    raw_fields: BTreeSet<String>,
    skills: Vec<Skill>,
    cognitive_services: Option<CognitiveServices>,
    selectors: Vec<ProjectionSelector>,
    projection_mode: ProjectionMode,
}

impl SkillsetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            raw_fields: BTreeSet::new(),
            skills: Vec::new(),
            cognitive_services: None,
            selectors: Vec::new(),
            projection_mode: ProjectionMode::SkipIndexingParentDocuments,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a path that exists before any skill runs.
    pub fn raw_field(mut self, path: impl Into<String>) -> Self {
        self.raw_fields.insert(path.into());
        self
    }

    pub fn raw_fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_fields.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn cognitive_services(mut self, services: CognitiveServices) -> Self {
        self.cognitive_services = Some(services);
        self
    }

    pub fn project(mut self, selector: ProjectionSelector) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn projection_mode(mut self, mode: ProjectionMode) -> Self {
        self.projection_mode = mode;
        self
    }

    /// Validate the graph and produce the payload.
    pub fn build(self) -> Result<Skillset, DefinitionError> {
        let cognitive_services = self
            .cognitive_services
            .clone()
            .ok_or_else(|| DefinitionError::MissingCognitiveServices(self.name.clone()))?;

        self.validate()?;

        Ok(Skillset {
            name: self.name,
            description: self.description,
            skills: self.skills,
            cognitive_services,
            index_projections: IndexProjections {
                selectors: self.selectors,
                parameters: ProjectionParameters {
                    projection_mode: self.projection_mode,
                },
            },
        })
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        let mut known = KnownPaths::new(&self.raw_fields);
        let mut names = BTreeSet::new();

        for skill in &self.skills {
            if !names.insert(skill.name.as_str()) {
                return Err(DefinitionError::DuplicateSkill(skill.name.clone()));
            }

            if !known.contains(&skill.context) {
                return Err(DefinitionError::UnknownContext {
                    skill: skill.name.clone(),
                    context: skill.context.clone(),
                });
            }

            if skill.kind == SkillKind::Conditional
                && !CONDITIONAL_INPUTS
                    .iter()
                    .all(|name| skill.input_source(name).is_some())
            {
                return Err(DefinitionError::MalformedConditional(skill.name.clone()));
            }

            for input in &skill.inputs {
                if let Some(path) = input.source.paths().into_iter().find(|p| !known.contains(p)) {
                    return Err(DefinitionError::DanglingSource {
                        skill: skill.name.clone(),
                        path: path.to_string(),
                    });
                }
                if let Some(path) = input
                    .source
                    .paths()
                    .into_iter()
                    .find(|p| !paths::is_readable_from(p, &skill.context))
                {
                    return Err(DefinitionError::ContextMismatch {
                        skill: skill.name.clone(),
                        context: skill.context.clone(),
                        path: path.to_string(),
                    });
                }
            }

            for target in skill.target_paths() {
                if !known.insert(target.clone()) {
                    return Err(DefinitionError::DuplicateTarget {
                        skill: skill.name.clone(),
                        target,
                    });
                }
            }
        }

        for selector in &self.selectors {
            if !known.contains(&selector.source_context) {
                return Err(DefinitionError::UnknownProjectionContext {
                    index: selector.target_index_name.clone(),
                    context: selector.source_context.clone(),
                });
            }
            for mapping in &selector.mappings {
                if !known.contains(&mapping.source) {
                    return Err(DefinitionError::UnknownProjectionSource {
                        field: mapping.name.clone(),
                        path: mapping.source.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Paths readable at the current point of the graph.
struct KnownPaths {
    paths: BTreeSet<String>,
}

impl KnownPaths {
    fn new(raw_fields: &BTreeSet<String>) -> Self {
        let mut paths = raw_fields.clone();
        paths.insert(paths::DOCUMENT.to_string());
        Self { paths }
    }

    /// A produced array is also readable item by item through `{path}/*`.
    fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
            || path
                .strip_suffix(WILDCARD)
                .and_then(|p| p.strip_suffix('/'))
                .is_some_and(|parent| self.paths.contains(parent))
    }

    fn insert(&mut self, path: String) -> bool {
        self.paths.insert(path)
    }
}
