//! Skill graph construction, validation and local simulation.
//!
//! Skills are connected through enrichment paths: each output lands at
//! `{context}/{targetName}` and later inputs refer to that path. The builder
//! checks those references in declaration order so a dangling path fails
//! here rather than at the service.

mod builder;
pub mod paths;
pub mod simulate;

pub use builder::SkillsetBuilder;
pub use simulate::{simulate, EnrichmentTree, SkillStub};
