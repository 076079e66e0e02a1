use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use eventdesk_catalog::{Event, EventCategory, EventDraft};
use eventdesk_core::{DomainError, EventId};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure of a remote gateway call.
///
/// These are **transport-level** outcomes as seen by the client: a status code
/// mapped to a category, or no response at all.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    /// HTTP 404.
    #[error("event not found")]
    NotFound,

    /// HTTP 400, or a draft rejected before sending. Carries every field message.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// HTTP 500.
    #[error("internal server error")]
    Internal,

    /// No response: connection refused, DNS failure, timeout.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Any other non-success status.
    #[error("unexpected response ({status}): {message}")]
    Status { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GatewayError::Unreachable(_))
    }
}

impl From<DomainError> for GatewayError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(messages) => GatewayError::Validation(messages),
            DomainError::NotFound => GatewayError::NotFound,
            DomainError::InvalidArgument(msg) | DomainError::InvalidId(msg) => {
                GatewayError::Validation(vec![msg])
            }
        }
    }
}

/// Remote persistence for events (the REST backend).
///
/// Implementations:
/// - [`HttpEventGateway`](super::HttpEventGateway): the real backend over HTTP
/// - [`InMemoryEventGateway`](super::InMemoryEventGateway): in-process, for tests/dev
#[async_trait::async_trait]
pub trait EventGateway: Send + Sync {
    /// `GET /events`
    async fn list(&self) -> GatewayResult<Vec<Event>>;

    /// `GET /events/{id}`
    async fn get(&self, id: EventId) -> GatewayResult<Event>;

    /// `POST /events`; returns the stored record with its assigned id.
    async fn create(&self, draft: &EventDraft) -> GatewayResult<Event>;

    /// `PUT /events/{id}`
    async fn update(&self, id: EventId, draft: &EventDraft) -> GatewayResult<Event>;

    /// `DELETE /events/{id}`
    async fn delete(&self, id: EventId) -> GatewayResult<()>;

    /// `GET /events/search?name=...` (server-side, case-insensitive name match).
    async fn search_by_name(&self, name: &str) -> GatewayResult<Vec<Event>>;

    /// `GET /events/category/{category}`
    async fn by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>>;

    /// `GET /events/upcoming` (event date strictly after today).
    async fn upcoming(&self) -> GatewayResult<Vec<Event>>;

    /// `GET /events/upcoming/category/{category}` (event date today or later).
    async fn upcoming_by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>>;

    /// `GET /events/date-range?startDate=...&endDate=...` (inclusive).
    async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Event>>;

    /// `GET /events/organizer?organizer=...` (case-insensitive substring).
    async fn by_organizer(&self, organizer: &str) -> GatewayResult<Vec<Event>>;
}

#[async_trait::async_trait]
impl<G> EventGateway for Arc<G>
where
    G: EventGateway + ?Sized,
{
    async fn list(&self) -> GatewayResult<Vec<Event>> {
        (**self).list().await
    }

    async fn get(&self, id: EventId) -> GatewayResult<Event> {
        (**self).get(id).await
    }

    async fn create(&self, draft: &EventDraft) -> GatewayResult<Event> {
        (**self).create(draft).await
    }

    async fn update(&self, id: EventId, draft: &EventDraft) -> GatewayResult<Event> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: EventId) -> GatewayResult<()> {
        (**self).delete(id).await
    }

    async fn search_by_name(&self, name: &str) -> GatewayResult<Vec<Event>> {
        (**self).search_by_name(name).await
    }

    async fn by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        (**self).by_category(category).await
    }

    async fn upcoming(&self) -> GatewayResult<Vec<Event>> {
        (**self).upcoming().await
    }

    async fn upcoming_by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        (**self).upcoming_by_category(category).await
    }

    async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Event>> {
        (**self).by_date_range(start, end).await
    }

    async fn by_organizer(&self, organizer: &str) -> GatewayResult<Vec<Event>> {
        (**self).by_organizer(organizer).await
    }
}
