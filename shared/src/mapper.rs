//! Conversion of Notion pages into calendar events.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::calendar::{EventDetails, FeedCalendar, UNTITLED};
use crate::link::page_url;
use crate::notion::{first_plain_text, NotionDate, Page, PageObject};
use crate::{Config, Error, Result};

/// A page reduced to what the calendar needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub details: EventDetails,
    pub start: NotionDate,
    pub end: Option<NotionDate>,
}

impl NormalizedEvent {
    /// Timed when an end is known, all-day otherwise.
    pub fn add_to(&self, calendar: &mut FeedCalendar) {
        match &self.end {
            Some(end) => calendar.add_timed_event(&self.details, &self.start, end),
            None => calendar.add_all_day_event(&self.details, &self.start),
        }
    }
}

/// Maps the pages of one database onto calendar events.
pub struct RowMapper<'a> {
    config: &'a Config,
    database_id: &'a str,
}

impl<'a> RowMapper<'a> {
    pub fn new(config: &'a Config, database_id: &'a str) -> Self {
        Self {
            config,
            database_id,
        }
    }

    /// Map a page and add it to the calendar.
    ///
    /// Errors are returned to the caller, which decides whether the whole
    /// feed fails.
    pub fn add_row(&self, row: &PageObject, calendar: &mut FeedCalendar) -> Result<()> {
        let event = self.normalize(row).map_err(|e| {
            error!("Failed to map page {}: {}", row.id(), e);
            e
        })?;

        debug!("Adding event {}", event.details.url);
        event.add_to(calendar);
        Ok(())
    }

    pub fn normalize(&self, row: &PageObject) -> Result<NormalizedEvent> {
        let page = match row {
            PageObject::Full(page) => page,
            PageObject::Partial(stub) => {
                return Err(Error::malformed_row(&stub.id, "page is not fully resolved"))
            }
        };

        let (start, end) = self.boundaries(page)?;

        let title = page
            .title_property(self.config.title_property.as_deref())
            .map_err(|e| Error::malformed_row(&page.id, e.to_string()))?;
        let summary = first_plain_text(title).unwrap_or(UNTITLED).to_string();

        let last_edited = DateTime::parse_from_rfc3339(&page.last_edited_time)
            .map_err(|e| {
                Error::malformed_row(&page.id, format!("invalid last_edited_time: {}", e))
            })?
            .with_timezone(&Utc);

        Ok(NormalizedEvent {
            details: EventDetails {
                uid: page.id.clone(),
                url: page_url(&self.config.organisation, self.database_id, &page.id),
                summary,
                description: format!("Last edited at: {}", page.last_edited_time),
                last_edited,
            },
            start,
            end,
        })
    }

    fn boundaries(&self, page: &Page) -> Result<(NotionDate, Option<NotionDate>)> {
        let property = &self.config.date_property;
        let date = page
            .date_property(property)
            .map_err(|e| Error::malformed_row(&page.id, e.to_string()))?
            .ok_or_else(|| Error::malformed_row(&page.id, format!("property {:?} is empty", property)))?;

        let time_zone = date.time_zone.as_deref();
        let parse = |raw: &str| {
            NotionDate::parse(raw, time_zone)
                .map_err(|e| Error::malformed_row(&page.id, format!("invalid date {:?}: {}", raw, e)))
        };

        let start = parse(&date.start)?;
        let end = date.end.as_deref().map(parse).transpose()?;
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Config {
        Config {
            notion_token: Some("secret_test".to_string()),
            organisation: "acme".to_string(),
            date_property: "Due".to_string(),
            title_property: None,
            notion_api_url: "http://localhost".to_string(),
            notion_version: "2022-06-28".to_string(),
        }
    }

    fn row(due: serde_json::Value, title: &str) -> PageObject {
        serde_json::from_value(json!({
            "object": "page",
            "id": "abc-123-def",
            "last_edited_time": "2024-01-10T08:00:00.000Z",
            "properties": {
                "Due": {"id": "d", "type": "date", "date": due},
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": title}]}
            }
        }))
        .unwrap()
    }

    fn assert_malformed(result: Result<NormalizedEvent>) {
        match result {
            Err(Error::MalformedRow { page_id, .. }) => assert_eq!(page_id, "abc-123-def"),
            other => panic!("expected a malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_normalizes_full_page() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let event = mapper
            .normalize(&row(json!({"start": "2024-01-15", "end": "2024-01-17"}), "Offsite"))
            .unwrap();

        assert_eq!(event.details.uid, "abc-123-def");
        assert_eq!(event.details.url, "https://notion.so/acme/db1?p=abc123def");
        assert_eq!(event.details.summary, "Offsite");
        assert_eq!(
            event.details.description,
            "Last edited at: 2024-01-10T08:00:00.000Z"
        );
        assert!(event.end.is_some());
    }

    #[test]
    fn test_empty_title_becomes_untitled() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let event = mapper
            .normalize(&row(json!({"start": "2024-01-15"}), ""))
            .unwrap();

        assert_eq!(event.details.summary, "Untitled");
    }

    #[test]
    fn test_start_only_is_all_day() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let mut calendar = FeedCalendar::new("Roadmap");
        mapper
            .add_row(&row(json!({"start": "2024-01-15"}), "Launch"), &mut calendar)
            .unwrap();

        let ics = calendar.serialize();
        assert!(ics.contains("DTSTART;VALUE=DATE:20240115"));
        assert!(!ics.contains("DTSTART:2024"));
        assert!(!ics.contains("DTEND"));
    }

    #[test]
    fn test_start_and_end_is_timed() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let mut calendar = FeedCalendar::new("Roadmap");
        mapper
            .add_row(
                &row(
                    json!({"start": "2024-01-15T09:00:00.000Z", "end": "2024-01-15T10:30:00.000Z"}),
                    "Review",
                ),
                &mut calendar,
            )
            .unwrap();

        let ics = calendar.serialize();
        assert!(ics.contains("DTSTART:20240115T090000Z"));
        assert!(ics.contains("DTEND:20240115T103000Z"));
        assert!(!ics.contains("VALUE=DATE"));
    }

    #[test]
    fn test_rejects_partial_page() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let stub: PageObject =
            serde_json::from_value(json!({"object": "page", "id": "abc-123-def"})).unwrap();

        assert_malformed(mapper.normalize(&stub));
    }

    #[test]
    fn test_rejects_missing_or_empty_date() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        assert_malformed(mapper.normalize(&row(serde_json::Value::Null, "Launch")));

        let other = Config {
            date_property: "When".to_string(),
            ..config
        };
        let mapper = RowMapper::new(&other, "db1");
        assert_malformed(mapper.normalize(&row(json!({"start": "2024-01-15"}), "Launch")));
    }

    #[test]
    fn test_rejects_unparseable_date() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        assert_malformed(mapper.normalize(&row(json!({"start": "soon"}), "Launch")));
    }

    #[test]
    fn test_rejects_wrong_title_type() {
        let config = Config {
            title_property: Some("Due".to_string()),
            ..config()
        };
        let mapper = RowMapper::new(&config, "db1");
        assert_malformed(mapper.normalize(&row(json!({"start": "2024-01-15"}), "Launch")));
    }

    #[test]
    fn test_failed_row_leaves_calendar_untouched() {
        let config = config();
        let mapper = RowMapper::new(&config, "db1");
        let mut calendar = FeedCalendar::new("Roadmap");

        assert!(mapper
            .add_row(&row(json!({"start": "soon"}), "Launch"), &mut calendar)
            .is_err());
        assert!(calendar.is_empty());
    }
}
