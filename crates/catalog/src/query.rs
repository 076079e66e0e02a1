//! Client-side event query engine.
//!
//! Takes the full event list held by the store and derives the list to display:
//! free-text search AND structured filters, then a stable sort. Pure and
//! deterministic; the input slice is never mutated and no view is cached.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, ValueObject};

use crate::event::{Event, EventCategory};

/// Structured filter set. `None` / blank fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilters {
    /// Exact match on the event category.
    pub category: Option<EventCategory>,
    /// Case-insensitive substring of the organizer.
    pub organizer: Option<String>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    /// Inclusive lower bound on the event date (`yyyy-MM-dd`).
    pub start_date: Option<String>,
    /// Inclusive upper bound on the event date (`yyyy-MM-dd`).
    pub end_date: Option<String>,
    /// Lower price bound; free events always pass.
    pub min_price: Option<f64>,
    /// Upper price bound; free events always pass.
    pub max_price: Option<f64>,
}

impl ValueObject for EventFilters {}

impl EventFilters {
    /// True when no filter field is active.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && active(&self.organizer).is_none()
            && active(&self.location).is_none()
            && active(&self.start_date).is_none()
            && active(&self.end_date).is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    pub fn matches(&self, event: &Event) -> bool {
        CompiledFilters::new(self).matches(event)
    }
}

/// Sortable fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    EventDate,
    Name,
    Organizer,
    Capacity,
    Price,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::EventDate,
        SortKey::Name,
        SortKey::Organizer,
        SortKey::Capacity,
        SortKey::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::EventDate => "eventDate",
            SortKey::Name => "name",
            SortKey::Organizer => "organizer",
            SortKey::Capacity => "capacity",
            SortKey::Price => "price",
        }
    }

    /// Ascending three-way comparison on this key.
    ///
    /// Dates compare as calendar days, text case-insensitively, numbers
    /// numerically with a missing price counted as `0`.
    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            SortKey::EventDate => a.event_date.cmp(&b.event_date),
            SortKey::Name => cmp_ignore_case(&a.name, &b.name),
            SortKey::Organizer => cmp_ignore_case(&a.organizer, &b.organizer),
            SortKey::Capacity => a.capacity.cmp(&b.capacity),
            SortKey::Price => a.price.unwrap_or(0.0).total_cmp(&b.price.unwrap_or(0.0)),
        }
    }
}

impl core::fmt::Display for SortKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("event_date") {
            return Ok(SortKey::EventDate);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                DomainError::invalid_argument(format!(
                    "unknown sort key '{wanted}' (expected one of: eventDate, name, organizer, capacity, price)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Orient an ascending comparison. Reverses the comparator, not the output,
    /// so equal keys keep their input order in both directions.
    pub fn orient(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::invalid_argument(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// A complete list query: free text, filters and sort directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventQuery {
    pub text: Option<String>,
    pub filters: EventFilters,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl ValueObject for EventQuery {}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_filters(mut self, filters: EventFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.sort_order = order;
        self
    }

    /// The effective search text: trimmed, `None` when blank.
    pub fn text(&self) -> Option<&str> {
        active(&self.text)
    }

    /// Whether a single event passes both the text query and the filters.
    pub fn matches(&self, event: &Event) -> bool {
        let filters = CompiledFilters::new(&self.filters);
        self.text().is_none_or(|t| matches_text(event, t)) && filters.matches(event)
    }

    /// Derive the display list from `events`.
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let filters = CompiledFilters::new(&self.filters);
        let needle = self.text().map(str::to_lowercase);

        let mut result: Vec<Event> = events
            .iter()
            .filter(|e| needle.as_deref().is_none_or(|n| text_contains(e, n)))
            .filter(|e| filters.matches(e))
            .cloned()
            .collect();

        // `sort_by` is stable: ties keep the store order.
        result.sort_by(|a, b| self.sort_order.orient(self.sort_by.compare(a, b)));

        tracing::trace!(
            total = events.len(),
            matched = result.len(),
            sort_by = %self.sort_by,
            "event query applied"
        );

        result
    }
}

/// Case-insensitive substring match of `query` against name, location,
/// organizer and description (a missing description never matches).
pub fn matches_text(event: &Event, query: &str) -> bool {
    text_contains(event, &query.to_lowercase())
}

fn text_contains(event: &Event, needle: &str) -> bool {
    [
        event.name.as_str(),
        event.location.as_str(),
        event.organizer.as_str(),
        event.description.as_deref().unwrap_or(""),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy)]
enum DateBound {
    Open,
    At(NaiveDate),
    Malformed,
}

impl DateBound {
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return DateBound::Open;
        };
        // Accept a full timestamp by keeping its date part.
        let date_part = raw.split('T').next().unwrap_or(raw);
        match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => DateBound::At(date),
            Err(err) => {
                tracing::debug!(bound = raw, error = %err, "malformed date bound; filter matches nothing");
                DateBound::Malformed
            }
        }
    }

    fn admits(&self, date: NaiveDate, accept: impl Fn(NaiveDate, NaiveDate) -> bool) -> bool {
        match self {
            DateBound::Open => true,
            DateBound::At(bound) => accept(date, *bound),
            DateBound::Malformed => false,
        }
    }
}

/// Filters with needles lowercased and dates parsed once per query.
struct CompiledFilters {
    category: Option<EventCategory>,
    organizer: Option<String>,
    location: Option<String>,
    start: DateBound,
    end: DateBound,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl CompiledFilters {
    fn new(filters: &EventFilters) -> Self {
        Self {
            category: filters.category,
            organizer: active(&filters.organizer).map(str::to_lowercase),
            location: active(&filters.location).map(str::to_lowercase),
            start: DateBound::parse(active(&filters.start_date)),
            end: DateBound::parse(active(&filters.end_date)),
            min_price: filters.min_price,
            max_price: filters.max_price,
        }
    }

    fn matches(&self, event: &Event) -> bool {
        self.category.is_none_or(|c| event.category == Some(c))
            && self
                .organizer
                .as_deref()
                .is_none_or(|o| event.organizer.to_lowercase().contains(o))
            && self
                .location
                .as_deref()
                .is_none_or(|l| event.location.to_lowercase().contains(l))
            && self.start.admits(event.event_date, |d, bound| d >= bound)
            && self.end.admits(event.event_date, |d, bound| d <= bound)
            && self.price_matches(event)
    }

    fn price_matches(&self, event: &Event) -> bool {
        if event.is_free() {
            return true;
        }
        let price = event.price.unwrap_or(0.0);
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }
}
