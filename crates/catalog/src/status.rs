//! Calendar status of an event relative to "today".

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Where an event date falls relative to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Past,
    Today,
    Tomorrow,
    Future,
}

impl EventStatus {
    pub fn of(event_date: NaiveDate, today: NaiveDate) -> Self {
        match days_until(event_date, today) {
            d if d < 0 => EventStatus::Past,
            0 => EventStatus::Today,
            1 => EventStatus::Tomorrow,
            _ => EventStatus::Future,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Past => "past",
            EventStatus::Today => "today",
            EventStatus::Tomorrow => "tomorrow",
            EventStatus::Future => "upcoming",
        }
    }
}

/// Whole days from `today` to `event_date` (negative for past events).
pub fn days_until(event_date: NaiveDate, today: NaiveDate) -> i64 {
    event_date.signed_duration_since(today).num_days()
}

/// Render a duration as `45min`, `2h` or `1h 30min`. Negative durations render as `0min`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_minutes().max(0);
    let (hours, minutes) = (total / 60, total % 60);

    match (hours, minutes) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}
