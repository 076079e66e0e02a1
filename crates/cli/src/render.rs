//! Terminal rendering of events.

use chrono::NaiveDate;

use eventdesk_catalog::{Event, format_duration};

/// One-line summary: id, schedule, name, category, place, organizer, capacity, price, status.
pub fn event_line(event: &Event, today: NaiveDate) -> String {
    let category = event
        .category
        .map(|c| format!(" [{}]", c.label()))
        .unwrap_or_default();

    format!(
        "#{id:<4} {date} {start}-{end} ({duration})  {name}{category}  @ {location}  by {organizer}  {capacity}  {price}  ({status})",
        id = event.id,
        date = event.event_date,
        start = event.start_time.format("%H:%M"),
        end = event.end_time.format("%H:%M"),
        duration = format_duration(event.duration()),
        name = event.name,
        location = event.location,
        organizer = event.organizer,
        capacity = capacity(event.capacity),
        price = price(event),
        status = event.status(today).label(),
    )
}

/// Multi-line detail view.
pub fn event_detail(event: &Event, today: NaiveDate) -> String {
    let mut out = event_line(event, today);
    if let Some(description) = &event.description {
        out.push_str("\n      ");
        out.push_str(description);
    }
    out
}

pub fn event_list(events: &[Event], today: NaiveDate) -> String {
    if events.is_empty() {
        return "no events".to_string();
    }
    events
        .iter()
        .map(|e| event_line(e, today))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capacity(n: u32) -> String {
    if n == 1 {
        "1 seat".to_string()
    } else {
        format!("{n} seats")
    }
}

fn price(event: &Event) -> String {
    match event.price {
        Some(p) if !event.is_free() => format!("{p:.2}"),
        _ => "free".to_string(),
    }
}
