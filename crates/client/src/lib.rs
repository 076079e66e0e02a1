//! `eventdesk-client`
//!
//! **Responsibility:** Client-side access to the event backend.
//!
//! This crate provides:
//! - The remote gateway (`EventGateway`) with HTTP and in-memory implementations
//! - The event store: the authoritative local list, kept in step with mutations
//! - Connectivity tracking (online/offline)
//! - A cancellable debouncer and the debounced name search built on it
//!
//! The backend remains the authority; this crate holds no durable state.

pub mod config;
pub mod debounce;
pub mod gateway;
pub mod offline;
pub mod search;
pub mod store;

pub use config::ClientConfig;
pub use debounce::{Debouncer, TimerHandle};
pub use gateway::{
    EventGateway, GatewayError, GatewayResult, HttpEventGateway, InMemoryEventGateway,
};
pub use offline::{ConnectivityState, OfflineError, OfflineMode};
pub use search::{SearchOrchestrator, SearchState};
pub use store::EventStore;
