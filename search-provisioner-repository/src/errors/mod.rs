//! Error types for the search provisioner repository.

mod provision_error;

pub use provision_error::ProvisionError;
