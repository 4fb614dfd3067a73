//! Azure AI Search implementation of the search service transport.
//!
//! This module provides a concrete implementation of `SearchServiceTransport`
//! against the search service management REST API.

mod transport;

pub use transport::AzureSearchTransport;
