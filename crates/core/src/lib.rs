//! `eventdesk-core`: foundation building blocks shared by every eventdesk crate.
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no runtime).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::EventId;
pub use value_object::ValueObject;
