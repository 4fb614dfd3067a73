//! # Search Provisioner
//!
//! Entry point and configuration for provisioning an Azure AI Search
//! enrichment pipeline: data source, index, skillset and indexer.

pub mod config;

pub use config::{Dependencies, ProvisionerConfig};

use search_provisioner_repository::ProvisionError;
use thiserror::Error;

/// Errors reading the process configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("Missing required environment variable {0}")]
    Missing(String),

    /// A variable is set but cannot be used.
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    pub fn missing(var: impl Into<String>) -> Self {
        Self::Missing(var.into())
    }

    pub fn invalid(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that stop the provisioner before the driver runs.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] ProvisionError),
}
