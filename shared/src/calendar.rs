//! In-memory iCalendar document built from Notion pages.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use tracing::warn;

use crate::notion::NotionDate;

/// Fallback for missing database and page titles.
pub const UNTITLED: &str = "Untitled";

/// Fields shared by timed and all-day events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    /// Notion page id
    pub uid: String,
    pub url: String,
    pub summary: String,
    pub description: String,
    /// Used as DTSTAMP so unchanged pages serialize identically
    pub last_edited: DateTime<Utc>,
}

/// Calendar document for a single feed request.
#[derive(Debug)]
pub struct FeedCalendar {
    name: String,
    calendar: Calendar,
    events: usize,
}

impl FeedCalendar {
    pub fn new(name: &str) -> Self {
        let name = if name.trim().is_empty() { UNTITLED } else { name };

        let mut calendar = Calendar::new();
        calendar.name(name);

        Self {
            name: name.to_string(),
            calendar,
            events: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of events added so far.
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Add an event with explicit start and end.
    pub fn add_timed_event(&mut self, details: &EventDetails, start: &NotionDate, end: &NotionDate) {
        let mut event = base_event(details);
        event.starts(timed(start)).ends(timed(end));
        self.push(event);
    }

    /// Add an event covering the whole start day. Only DTSTART is written.
    pub fn add_all_day_event(&mut self, details: &EventDetails, start: &NotionDate) {
        let mut event = base_event(details);
        event.starts(DatePerhapsTime::Date(start.date()));
        self.push(event);
    }

    /// Render the document as iCalendar text.
    pub fn serialize(&self) -> String {
        self.calendar.to_string()
    }

    fn push(&mut self, event: Event) {
        self.calendar.push(event);
        self.events += 1;
    }
}

fn base_event(details: &EventDetails) -> Event {
    let mut event = Event::new();
    event
        .uid(&details.uid)
        .timestamp(details.last_edited)
        .url(&details.url)
        .summary(&details.summary)
        .description(&details.description);
    event
}

/// Date-only boundaries of a timed event start at midnight UTC. Zoned local
/// times are resolved to UTC so no VTIMEZONE is needed; unknown zones and
/// times inside a DST gap stay floating.
fn timed(date: &NotionDate) -> DatePerhapsTime {
    match date {
        NotionDate::Date(date) => {
            CalendarDateTime::Utc(date.and_time(chrono::NaiveTime::MIN).and_utc()).into()
        }
        NotionDate::Offset(date_time) => {
            CalendarDateTime::Utc(date_time.with_timezone(&Utc)).into()
        }
        NotionDate::Local {
            date_time,
            time_zone,
        } => match time_zone.as_deref().and_then(|tz| resolve_local(date_time, tz)) {
            Some(utc) => CalendarDateTime::Utc(utc).into(),
            None => CalendarDateTime::Floating(*date_time).into(),
        },
    }
}

fn resolve_local(date_time: &NaiveDateTime, time_zone: &str) -> Option<DateTime<Utc>> {
    let tz: Tz = match time_zone.parse() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Unknown time zone {:?}, using floating time", time_zone);
            return None;
        }
    };

    tz.from_local_datetime(date_time)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
