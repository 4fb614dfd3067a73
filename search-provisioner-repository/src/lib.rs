//! # Search Provisioner Repository
//!
//! This crate provides the transport seam between the provisioner and the
//! search service. It includes the error type shared by every ensure
//! operation, the `SearchServiceTransport` trait, a concrete implementation
//! for the Azure AI Search REST API, and the `ResourceClient` that turns one
//! PUT into an `Outcome`.

pub mod azure;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;

pub use azure::AzureSearchTransport;
pub use client::ResourceClient;
pub use config::TransportConfig;
pub use errors::ProvisionError;
pub use interfaces::{SearchServiceTransport, TransportResponse};
