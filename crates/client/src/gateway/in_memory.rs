use std::sync::RwLock;

use chrono::NaiveDate;

use eventdesk_catalog::{Event, EventCategory, EventDraft};
use eventdesk_core::EventId;

use super::r#trait::{EventGateway, GatewayError, GatewayResult};

#[derive(Debug, Default)]
struct State {
    events: Vec<Event>,
    next_id: i64,
    fail_next: Option<GatewayError>,
    searches: Vec<String>,
}

/// In-process `EventGateway` with the backend's query semantics.
///
/// Intended for tests/dev. Ids are assigned sequentially; "today" is fixed at
/// construction so `upcoming` queries are deterministic.
#[derive(Debug)]
pub struct InMemoryEventGateway {
    state: RwLock<State>,
    today: NaiveDate,
}

impl InMemoryEventGateway {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_events(today, Vec::new())
    }

    /// Seed with existing records; new ids continue after the largest seeded id.
    pub fn with_events(today: NaiveDate, events: Vec<Event>) -> Self {
        let next_id = events.iter().map(|e| e.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: RwLock::new(State {
                events,
                next_id,
                ..State::default()
            }),
            today,
        }
    }

    /// Make the next call fail with `err` (one-shot).
    pub fn fail_next(&self, err: GatewayError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_next = Some(err);
        }
    }

    /// Current server-side records, in insertion order.
    pub fn snapshot(&self) -> Vec<Event> {
        self.state
            .read()
            .map(|s| s.events.clone())
            .unwrap_or_default()
    }

    /// Every term received by `search_by_name`, oldest first.
    pub fn search_calls(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.searches.clone())
            .unwrap_or_default()
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> GatewayResult<T> {
        self.take_failure()?;
        let state = self.state.read().map_err(|_| GatewayError::Internal)?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> GatewayResult<T>) -> GatewayResult<T> {
        self.take_failure()?;
        let mut state = self.state.write().map_err(|_| GatewayError::Internal)?;
        f(&mut state)
    }

    fn take_failure(&self) -> GatewayResult<()> {
        let mut state = self.state.write().map_err(|_| GatewayError::Internal)?;
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn select(&self, pred: impl Fn(&Event) -> bool) -> GatewayResult<Vec<Event>> {
        self.read(|s| s.events.iter().filter(|e| pred(e)).cloned().collect())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait::async_trait]
impl EventGateway for InMemoryEventGateway {
    async fn list(&self) -> GatewayResult<Vec<Event>> {
        self.read(|s| s.events.clone())
    }

    async fn get(&self, id: EventId) -> GatewayResult<Event> {
        self.read(|s| s.events.iter().find(|e| e.id == id).cloned())?
            .ok_or(GatewayError::NotFound)
    }

    async fn create(&self, draft: &EventDraft) -> GatewayResult<Event> {
        draft.validate()?;
        self.write(|s| {
            let event = Event::from_draft(EventId::new(s.next_id), draft.clone());
            s.next_id += 1;
            s.events.push(event.clone());
            Ok(event)
        })
    }

    async fn update(&self, id: EventId, draft: &EventDraft) -> GatewayResult<Event> {
        draft.validate()?;
        self.write(|s| {
            let slot = s
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(GatewayError::NotFound)?;
            *slot = Event::from_draft(id, draft.clone());
            Ok(slot.clone())
        })
    }

    async fn delete(&self, id: EventId) -> GatewayResult<()> {
        self.write(|s| {
            let before = s.events.len();
            s.events.retain(|e| e.id != id);
            if s.events.len() == before {
                Err(GatewayError::NotFound)
            } else {
                Ok(())
            }
        })
    }

    async fn search_by_name(&self, name: &str) -> GatewayResult<Vec<Event>> {
        self.write(|s| {
            s.searches.push(name.to_string());
            Ok(s
                .events
                .iter()
                .filter(|e| contains_ignore_case(&e.name, name))
                .cloned()
                .collect())
        })
    }

    async fn by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        self.select(|e| e.category == Some(category))
    }

    async fn upcoming(&self) -> GatewayResult<Vec<Event>> {
        self.select(|e| e.event_date > self.today)
    }

    async fn upcoming_by_category(&self, category: EventCategory) -> GatewayResult<Vec<Event>> {
        self.select(|e| e.category == Some(category) && e.event_date >= self.today)
    }

    async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Event>> {
        self.select(|e| e.event_date >= start && e.event_date <= end)
    }

    async fn by_organizer(&self, organizer: &str) -> GatewayResult<Vec<Event>> {
        self.select(|e| contains_ignore_case(&e.organizer, organizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap()
    }

    fn draft(name: &str, date: NaiveDate, category: EventCategory) -> EventDraft {
        EventDraft {
            name: name.to_string(),
            event_date: date,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            location: "Online".to_string(),
            organizer: "DevRel Team".to_string(),
            capacity: 100,
            description: None,
            price: None,
            category: Some(category),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let gateway = InMemoryEventGateway::new(day(1));
        let a = gateway.create(&draft("First", day(5), EventCategory::Meetup)).await.unwrap();
        let b = gateway.create(&draft("Second", day(6), EventCategory::Meetup)).await.unwrap();

        assert_eq!(a.id, EventId::new(1));
        assert_eq!(b.id, EventId::new(2));
        assert_eq!(gateway.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_invalid_drafts() {
        let gateway = InMemoryEventGateway::new(day(1));
        let bad = EventDraft {
            capacity: 0,
            ..draft("Broken", day(5), EventCategory::Other)
        };

        let err = gateway.create(&bad).await.unwrap_err();
        assert_eq!(err, GatewayError::Validation(vec!["capacity must be at least 1".to_string()]));
        assert!(gateway.snapshot().is_empty());
    }

    #[tokio::test]
    async fn upcoming_is_strictly_after_today_but_by_category_includes_today() {
        let gateway = InMemoryEventGateway::new(day(10));
        gateway.create(&draft("Today", day(10), EventCategory::Workshop)).await.unwrap();
        gateway.create(&draft("Later", day(11), EventCategory::Workshop)).await.unwrap();
        gateway.create(&draft("Past", day(9), EventCategory::Workshop)).await.unwrap();

        let upcoming = gateway.upcoming().await.unwrap();
        assert_eq!(upcoming.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), ["Later"]);

        let by_category = gateway.upcoming_by_category(EventCategory::Workshop).await.unwrap();
        assert_eq!(by_category.len(), 2);
    }

    #[tokio::test]
    async fn failure_injection_is_one_shot() {
        let gateway = InMemoryEventGateway::new(day(1));
        gateway.fail_next(GatewayError::Internal);

        assert_eq!(gateway.list().await.unwrap_err(), GatewayError::Internal);
        assert!(gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let gateway = InMemoryEventGateway::new(day(1));
        assert_eq!(gateway.delete(EventId::new(99)).await.unwrap_err(), GatewayError::NotFound);
    }

    #[tokio::test]
    async fn search_and_organizer_are_case_insensitive() {
        let gateway = InMemoryEventGateway::new(day(1));
        gateway.create(&draft("Rust Summit", day(5), EventCategory::Conference)).await.unwrap();
        gateway.create(&draft("Go Day", day(6), EventCategory::Conference)).await.unwrap();

        assert_eq!(gateway.search_by_name("rUsT").await.unwrap().len(), 1);
        assert_eq!(gateway.by_organizer("devrel").await.unwrap().len(), 2);
        assert_eq!(gateway.search_calls(), ["rUsT"]);
    }
}
