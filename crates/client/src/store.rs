//! Client-side event store.
//!
//! `EventStore` holds the authoritative in-memory list of events as last
//! fetched from the backend and keeps it in step with successful mutations.
//! Derived views are computed on demand through [`EventQuery`]; the store
//! never caches them.
//!
//! Every operation clears the previous error first. A failed call records its
//! error, leaves the list untouched and is returned to the caller unchanged.

use chrono::NaiveDate;

use eventdesk_catalog::{Event, EventCategory, EventDraft, EventQuery};
use eventdesk_core::{Entity, EventId};

use crate::gateway::{EventGateway, GatewayError, GatewayResult};
use crate::offline::{ConnectivityState, OfflineMode};

pub struct EventStore<G> {
    gateway: G,
    events: Vec<Event>,
    last_error: Option<GatewayError>,
    connectivity: OfflineMode,
}

impl<G: EventGateway> EventStore<G> {
    /// Create an empty store; call [`load`](Self::load) to populate it.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            events: Vec::new(),
            last_error: None,
            connectivity: OfflineMode::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Events in server order, with local mutations applied.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Filtered and sorted view over the current events.
    pub fn view(&self, query: &EventQuery) -> Vec<Event> {
        query.apply(&self.events)
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity.state()
    }

    /// Replace the list with the backend's full collection.
    pub async fn load(&mut self) -> GatewayResult<&[Event]> {
        self.begin();
        let result = self.gateway.list().await;
        let events = self.settle(result)?;
        tracing::info!(count = events.len(), "events loaded");
        self.events = events;
        Ok(&self.events)
    }

    pub async fn get(&mut self, id: EventId) -> GatewayResult<Event> {
        self.begin();
        let result = self.gateway.get(id).await;
        self.settle(result)
    }

    /// Validate and create; the stored record is appended to the list.
    pub async fn create(&mut self, draft: &EventDraft) -> GatewayResult<Event> {
        self.begin();
        let draft = self.prepare(draft)?;
        let result = self.gateway.create(&draft).await;
        let event = self.settle(result)?;
        tracing::info!(id = %event.id, name = %event.name, "event created");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Validate and update; the record with the same id is replaced in place.
    pub async fn update(&mut self, id: EventId, draft: &EventDraft) -> GatewayResult<Event> {
        self.begin();
        let draft = self.prepare(draft)?;
        let result = self.gateway.update(id, &draft).await;
        let event = self.settle(result)?;
        tracing::info!(%id, "event updated");
        if let Some(slot) = self.events.iter_mut().find(|e| e.same_identity(&event)) {
            *slot = event.clone();
        }
        Ok(event)
    }

    pub async fn delete(&mut self, id: EventId) -> GatewayResult<()> {
        self.begin();
        let result = self.gateway.delete(id).await;
        self.settle(result)?;
        tracing::info!(%id, "event deleted");
        self.events.retain(|e| e.id != id);
        Ok(())
    }

    /// Remote name search. A blank term returns the current list without a call.
    pub async fn search(&mut self, name: &str) -> GatewayResult<Vec<Event>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(self.events.clone());
        }
        self.begin();
        let result = self.gateway.search_by_name(name).await;
        self.settle(result)
    }

    pub async fn by_category(&mut self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        self.begin();
        let result = self.gateway.by_category(category).await;
        self.settle(result)
    }

    pub async fn upcoming(&mut self) -> GatewayResult<Vec<Event>> {
        self.begin();
        let result = self.gateway.upcoming().await;
        self.settle(result)
    }

    pub async fn upcoming_by_category(
        &mut self,
        category: EventCategory,
    ) -> GatewayResult<Vec<Event>> {
        self.begin();
        let result = self.gateway.upcoming_by_category(category).await;
        self.settle(result)
    }

    pub async fn by_date_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> GatewayResult<Vec<Event>> {
        self.begin();
        let result = self.gateway.by_date_range(start, end).await;
        self.settle(result)
    }

    pub async fn by_organizer(&mut self, organizer: &str) -> GatewayResult<Vec<Event>> {
        self.begin();
        let result = self.gateway.by_organizer(organizer).await;
        self.settle(result)
    }

    fn begin(&mut self) {
        self.last_error = None;
    }

    fn prepare(&mut self, draft: &EventDraft) -> GatewayResult<EventDraft> {
        let draft = draft.normalized();
        draft
            .validate()
            .map_err(GatewayError::from)
            .map_err(|e| self.record(e))?;
        Ok(draft)
    }

    fn settle<T>(&mut self, result: GatewayResult<T>) -> GatewayResult<T> {
        match result {
            Ok(value) => {
                self.connectivity.set_online();
                Ok(value)
            }
            Err(err) => {
                if err.is_unreachable() {
                    self.connectivity.set_offline();
                }
                Err(self.record(err))
            }
        }
    }

    fn record(&mut self, err: GatewayError) -> GatewayError {
        tracing::warn!(error = %err, "event operation failed");
        self.last_error = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryEventGateway;
    use chrono::NaiveTime;
    use eventdesk_catalog::{EventFilters, SortKey, SortOrder};
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, d).unwrap()
    }

    fn draft(name: &str, date: NaiveDate) -> EventDraft {
        EventDraft {
            name: name.to_string(),
            event_date: date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            location: "Auditório A".to_string(),
            organizer: "TechCorp".to_string(),
            capacity: 50,
            description: None,
            price: None,
            category: Some(EventCategory::Conference),
        }
    }

    async fn seeded() -> EventStore<Arc<InMemoryEventGateway>> {
        let gateway = Arc::new(InMemoryEventGateway::new(day(1)));
        for (name, d) in [("Alpha", 10), ("Bravo", 5), ("Charlie", 20)] {
            gateway.create(&draft(name, day(d))).await.unwrap();
        }
        let mut store = EventStore::new(gateway);
        store.load().await.unwrap();
        store
    }

    fn names(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn load_keeps_server_order() {
        let store = seeded().await;
        assert_eq!(names(store.events()), ["Alpha", "Bravo", "Charlie"]);
        assert_eq!(store.connectivity(), ConnectivityState::Online);
    }

    #[tokio::test]
    async fn create_appends_and_normalizes() {
        let mut store = seeded().await;
        let created = store
            .create(&EventDraft {
                description: Some("   ".to_string()),
                ..draft("  Delta  ", day(2))
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Delta");
        assert_eq!(created.description, None);
        assert_eq!(names(store.events()), ["Alpha", "Bravo", "Charlie", "Delta"]);
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let mut store = seeded().await;
        let bravo = store.events()[1].id;

        store.update(bravo, &draft("Bravo II", day(6))).await.unwrap();

        assert_eq!(names(store.events()), ["Alpha", "Bravo II", "Charlie"]);
        assert_eq!(store.events()[1].id, bravo);
    }

    #[tokio::test]
    async fn delete_preserves_order_of_the_rest() {
        let mut store = seeded().await;
        let alpha = store.events()[0].id;

        store.delete(alpha).await.unwrap();

        assert_eq!(names(store.events()), ["Bravo", "Charlie"]);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_list_and_records_error() {
        let mut store = seeded().await;
        let before = store.events().to_vec();
        store.gateway().fail_next(GatewayError::Internal);

        let err = store.delete(before[0].id).await.unwrap_err();

        assert_eq!(err, GatewayError::Internal);
        assert_eq!(store.events(), before.as_slice());
        assert_eq!(store.last_error(), Some(&GatewayError::Internal));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_any_call() {
        let mut store = seeded().await;
        let before = store.gateway().snapshot().len();

        let err = store
            .create(&EventDraft {
                capacity: 0,
                ..draft("Zz", day(2))
            })
            .await
            .unwrap_err();

        match err {
            GatewayError::Validation(messages) => assert_eq!(messages.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.gateway().snapshot().len(), before);
        assert_eq!(store.events().len(), 3);
    }

    #[tokio::test]
    async fn next_operation_clears_previous_error() {
        let mut store = seeded().await;
        store.gateway().fail_next(GatewayError::Internal);
        assert!(store.load().await.is_err());
        assert!(store.last_error().is_some());

        store.load().await.unwrap();
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn unreachable_flips_offline_until_next_success() {
        let mut store = seeded().await;
        store
            .gateway()
            .fail_next(GatewayError::Unreachable("connection refused".to_string()));

        assert!(store.upcoming().await.is_err());
        assert_eq!(store.connectivity(), ConnectivityState::Offline);

        store.upcoming().await.unwrap();
        assert_eq!(store.connectivity(), ConnectivityState::Online);
    }

    #[tokio::test]
    async fn blank_search_returns_current_list_without_calling() {
        let mut store = seeded().await;

        let all = store.search("   ").await.unwrap();

        assert_eq!(all.len(), 3);
        assert!(store.gateway().search_calls().is_empty());

        let hits = store.search(" char ").await.unwrap();
        assert_eq!(names(&hits), ["Charlie"]);
        assert_eq!(store.gateway().search_calls(), ["char"]);
    }

    #[tokio::test]
    async fn queries_do_not_touch_the_list() {
        let mut store = seeded().await;

        let ranged = store.by_date_range(day(5), day(10)).await.unwrap();
        assert_eq!(names(&ranged), ["Alpha", "Bravo"]);
        assert_eq!(store.by_organizer("techcorp").await.unwrap().len(), 3);
        assert_eq!(store.by_category(EventCategory::Workshop).await.unwrap().len(), 0);
        assert_eq!(store.events().len(), 3);
    }

    #[tokio::test]
    async fn view_is_recomputed_from_current_list() {
        let mut store = seeded().await;
        let query = EventQuery::new().sorted_by(SortKey::EventDate, SortOrder::Asc);
        assert_eq!(names(&store.view(&query)), ["Bravo", "Alpha", "Charlie"]);

        store.create(&draft("Echo", day(1))).await.unwrap();
        let query = query.with_filters(EventFilters {
            end_date: Some("2030-03-05".to_string()),
            ..EventFilters::default()
        });
        assert_eq!(names(&store.view(&query)), ["Echo", "Bravo"]);
    }
}
