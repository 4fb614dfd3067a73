//! Interface definitions for the search service transport.
//!
//! `SearchServiceTransport` is the seam between resource declaration and the
//! network, so tests can swap in a recording mock.

mod search_service_transport;

pub use search_service_transport::{SearchServiceTransport, TransportResponse};
