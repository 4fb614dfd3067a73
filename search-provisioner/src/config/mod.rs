//! Configuration and dependency wiring.

mod dependencies;
mod environment;

pub use dependencies::Dependencies;
pub use environment::{ProvisionerConfig, ResourceNames, SetupFlags};
