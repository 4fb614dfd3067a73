//! Local dry evaluation of a skillset over a synthetic document.
//!
//! The service executes the real pipeline. This walks the same graph in
//! declaration order so branch selection can be checked without it:
//! conditional skills are evaluated here, every other skill is answered by a
//! caller-supplied `SkillStub`.

use std::collections::BTreeMap;

use serde_json::Value;

use search_provisioner_shared::{InputSource, Skill, SkillKind, Skillset};

use crate::graph::paths;

/// Answers for the skills the simulator cannot evaluate itself.
pub trait SkillStub {
    /// Return output values keyed by output name (not target name).
    fn run(&mut self, skill: &Skill, inputs: &BTreeMap<String, Value>) -> BTreeMap<String, Value>;
}

/// Flat view of the enrichment tree: concrete path to value.
///
/// Array items are addressable by index, so `/document/chunks/0` is the
/// first element of `/document/chunks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentTree {
    values: BTreeMap<String, Value>,
}

impl EnrichmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.set(path, value);
        self
    }

    pub fn set(&mut self, path: &str, value: Value) {
        if let Value::Array(items) = &value {
            for (i, item) in items.iter().enumerate() {
                self.set(&format!("{}/{}", path, i), item.clone());
            }
        }
        self.values.insert(path.to_string(), value);
    }

    /// Value at a concrete path; null when absent.
    pub fn get(&self, path: &str) -> Value {
        self.values.get(path).cloned().unwrap_or(Value::Null)
    }

    /// Concrete paths matching a pattern, expanding each wildcard over the
    /// items of the array it follows.
    pub fn instances(&self, pattern: &str) -> Vec<String> {
        let mut prefixes = vec![String::new()];

        for segment in pattern.split('/').skip(1) {
            let mut next = Vec::new();
            for prefix in &prefixes {
                if segment == paths::WILDCARD {
                    let len = self.get(prefix).as_array().map_or(0, Vec::len);
                    next.extend((0..len).map(|i| format!("{}/{}", prefix, i)));
                } else {
                    next.push(format!("{}/{}", prefix, segment));
                }
            }
            prefixes = next;
        }

        prefixes
    }

    /// Read a path, collecting wildcard paths into an array.
    pub fn resolve(&self, path: &str) -> Value {
        if paths::has_wildcard(path) {
            Value::Array(self.instances(path).iter().map(|p| self.get(p)).collect())
        } else {
            self.get(path)
        }
    }

    fn source_value(&self, source: &InputSource, bind: &impl Fn(&str) -> String) -> Value {
        match source {
            InputSource::Path(path) => self.resolve(&bind(path)),
            InputSource::Expr(expr) => expr.evaluate(&|path: &str| self.resolve(&bind(path))),
        }
    }
}

/// Run every skill of `skillset` over `tree` in declaration order.
pub fn simulate(
    skillset: &Skillset,
    mut tree: EnrichmentTree,
    stub: &mut impl SkillStub,
) -> EnrichmentTree {
    for skill in &skillset.skills {
        for instance in tree.instances(&skill.context) {
            let bind = |path: &str| paths::bind(path, &skill.context, &instance);

            let inputs: BTreeMap<String, Value> = skill
                .inputs
                .iter()
                .map(|input| (input.name.clone(), tree.source_value(&input.source, &bind)))
                .collect();

            let outputs = match skill.kind {
                SkillKind::Conditional => select(&inputs),
                _ => stub.run(skill, &inputs),
            };

            for output in &skill.outputs {
                if let Some(value) = outputs.get(&output.name) {
                    tree.set(&paths::join(&instance, &output.target_name), value.clone());
                }
            }
        }
    }

    tree
}

fn select(inputs: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    let branch = match inputs.get("condition") {
        Some(Value::Bool(true)) => "whenTrue",
        _ => "whenFalse",
    };
    let value = inputs.get(branch).cloned().unwrap_or(Value::Null);
    BTreeMap::from([("output".to_string(), value)])
}
