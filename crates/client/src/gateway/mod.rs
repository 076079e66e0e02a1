//! Remote gateway boundary.
//!
//! The backend owns persistence; this module defines the client-facing
//! abstraction over its REST endpoints and the HTTP/in-memory implementations.

pub mod http;
pub mod in_memory;
pub mod r#trait;

pub use http::HttpEventGateway;
pub use in_memory::InMemoryEventGateway;
pub use r#trait::{EventGateway, GatewayError, GatewayResult};
