//! Event catalog domain module.
//!
//! The event record, its category set, draft invariants, calendar status
//! helpers and the client-side query engine. Pure logic: no IO, no HTTP.

pub mod event;
pub mod query;
pub mod status;

pub use event::{hhmm, Event, EventCategory, EventDraft, MIN_NAME_CHARS};
pub use query::{matches_text, EventFilters, EventQuery, SortKey, SortOrder};
pub use status::{days_until, format_duration, EventStatus};
