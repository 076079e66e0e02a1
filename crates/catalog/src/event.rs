use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, DomainResult, Entity, EventId, ValueObject};

use crate::status::EventStatus;

/// Fixed set of event categories (wire format: upper-case names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategory {
    Conference,
    Workshop,
    Seminar,
    Meetup,
    Hackathon,
    Training,
    Networking,
    Presentation,
    Course,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 10] = [
        EventCategory::Conference,
        EventCategory::Workshop,
        EventCategory::Seminar,
        EventCategory::Meetup,
        EventCategory::Hackathon,
        EventCategory::Training,
        EventCategory::Networking,
        EventCategory::Presentation,
        EventCategory::Course,
        EventCategory::Other,
    ];

    /// Wire name, as used in URLs (`/events/category/{name}`) and JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Conference => "CONFERENCE",
            EventCategory::Workshop => "WORKSHOP",
            EventCategory::Seminar => "SEMINAR",
            EventCategory::Meetup => "MEETUP",
            EventCategory::Hackathon => "HACKATHON",
            EventCategory::Training => "TRAINING",
            EventCategory::Networking => "NETWORKING",
            EventCategory::Presentation => "PRESENTATION",
            EventCategory::Course => "COURSE",
            EventCategory::Other => "OTHER",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Conference => "Conferência",
            EventCategory::Workshop => "Workshop",
            EventCategory::Seminar => "Seminário",
            EventCategory::Meetup => "Meetup",
            EventCategory::Hackathon => "Hackathon",
            EventCategory::Training => "Treinamento",
            EventCategory::Networking => "Networking",
            EventCategory::Presentation => "Apresentação",
            EventCategory::Course => "Curso",
            EventCategory::Other => "Outro",
        }
    }
}

impl core::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EventCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::invalid_argument(format!("unknown category '{wanted}'")))
    }
}

/// Event record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub event_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub location: String,
    pub organizer: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

impl Event {
    /// Attach a server-assigned id to a draft.
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Self {
            id,
            name: draft.name,
            event_date: draft.event_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location: draft.location,
            organizer: draft.organizer,
            capacity: draft.capacity,
            description: draft.description,
            price: draft.price,
            category: draft.category,
        }
    }

    /// Editable copy of this record (everything but the id).
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            name: self.name.clone(),
            event_date: self.event_date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location.clone(),
            organizer: self.organizer.clone(),
            capacity: self.capacity,
            description: self.description.clone(),
            price: self.price,
            category: self.category,
        }
    }

    /// Absent or zero price means free admission.
    pub fn is_free(&self) -> bool {
        self.price.is_none_or(|p| p == 0.0)
    }

    /// Length of the time window; negative when the window is inverted.
    pub fn duration(&self) -> Duration {
        self.end_time.signed_duration_since(self.start_time)
    }

    pub fn status(&self, today: NaiveDate) -> EventStatus {
        EventStatus::of(self.event_date, today)
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Body of create/update requests: an event without its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub event_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub location: String,
    pub organizer: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

impl ValueObject for EventDraft {}

/// Minimum name length (in characters, after trimming).
pub const MIN_NAME_CHARS: usize = 3;

impl EventDraft {
    /// Canonical form sent to the backend: text fields trimmed, blank
    /// description dropped, zero price dropped.
    pub fn normalized(&self) -> Self {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Self {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            organizer: self.organizer.trim().to_string(),
            description,
            price: self.price.filter(|p| *p != 0.0),
            ..self.clone()
        }
    }

    /// Check the record invariants, collecting every violation.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();

        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.push(format!("name must have at least {MIN_NAME_CHARS} characters"));
        }
        if self.start_time >= self.end_time {
            errors.push("start time must be before end time".to_string());
        }
        if self.location.trim().is_empty() {
            errors.push("location is required".to_string());
        }
        if self.organizer.trim().is_empty() {
            errors.push("organizer is required".to_string());
        }
        if self.capacity < 1 {
            errors.push("capacity must be at least 1".to_string());
        }
        if self.price.is_some_and(|p| p < 0.0 || p.is_nan()) {
            errors.push("price must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }
}

/// `HH:mm` wire codec for times of day (`HH:mm:ss` accepted on input).
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time of day '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, FORMAT))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft() -> EventDraft {
        EventDraft {
            name: "Rust Meetup".to_string(),
            event_date: NaiveDate::from_ymd_opt(2030, 5, 10).unwrap(),
            start_time: time(18, 0),
            end_time: time(21, 30),
            location: "Belo Horizonte".to_string(),
            organizer: "Rustaceans BH".to_string(),
            capacity: 40,
            description: None,
            price: None,
            category: Some(EventCategory::Meetup),
        }
    }

    #[test]
    fn deserializes_backend_payload() {
        let payload = json!({
            "id": 3,
            "name": "AI Conference",
            "eventDate": "2030-09-01",
            "startTime": "09:00",
            "endTime": "17:30:00",
            "location": "São Paulo",
            "organizer": "TechCorp",
            "capacity": 300,
            "price": 150.0,
            "category": "CONFERENCE"
        });

        let event: Event = serde_json::from_value(payload).unwrap();
        assert_eq!(event.id, EventId::new(3));
        assert_eq!(event.end_time, time(17, 30));
        assert_eq!(event.category, Some(EventCategory::Conference));
        assert_eq!(event.description, None);
        assert!(!event.is_free());
    }

    #[test]
    fn serializes_times_as_hours_and_minutes() {
        let value = serde_json::to_value(draft()).unwrap();
        assert_eq!(value["startTime"], "18:00");
        assert_eq!(value["eventDate"], "2030-05-10");
        assert_eq!(value["category"], "MEETUP");
        assert!(value.get("price").is_none());
    }

    #[test]
    fn rejects_malformed_time() {
        let payload = json!({
            "id": 1, "name": "x", "eventDate": "2030-01-01",
            "startTime": "9 o'clock", "endTime": "10:00",
            "location": "l", "organizer": "o", "capacity": 1
        });
        assert!(serde_json::from_value::<Event>(payload).is_err());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("workshop".parse::<EventCategory>().unwrap(), EventCategory::Workshop);
        assert_eq!(" HACKATHON ".parse::<EventCategory>().unwrap(), EventCategory::Hackathon);
        assert!(matches!(
            "party".parse::<EventCategory>(),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(draft().validate(), Ok(()));
    }

    #[test]
    fn validate_collects_every_violation() {
        let bad = EventDraft {
            name: " ab ".to_string(),
            start_time: time(10, 0),
            end_time: time(10, 0),
            organizer: "  ".to_string(),
            capacity: 0,
            price: Some(-1.0),
            ..draft()
        };

        let err = bad.validate().unwrap_err();
        assert_eq!(
            err.messages(),
            [
                "name must have at least 3 characters",
                "start time must be before end time",
                "organizer is required",
                "capacity must be at least 1",
                "price must not be negative",
            ]
        );
    }

    #[test]
    fn normalized_trims_and_drops_empty_optionals() {
        let messy = EventDraft {
            name: "  Rust Meetup ".to_string(),
            location: " BH ".to_string(),
            description: Some("   ".to_string()),
            price: Some(0.0),
            ..draft()
        };

        let clean = messy.normalized();
        assert_eq!(clean.name, "Rust Meetup");
        assert_eq!(clean.location, "BH");
        assert_eq!(clean.description, None);
        assert_eq!(clean.price, None);
    }

    #[test]
    fn draft_round_trips_through_event() {
        let event = Event::from_draft(EventId::new(9), draft());
        assert_eq!(event.to_draft(), draft());
        assert_eq!(event.duration(), Duration::minutes(210));
        assert!(event.is_free());
    }
}
