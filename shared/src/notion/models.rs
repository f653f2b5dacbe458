//! Notion API wire types.
//!
//! Only the parts of the object model the feed needs are modelled. Property
//! values are a tagged union on `type`; anything other than `date` and `title`
//! is kept as [`PropertyValue::Other`] so that wrong-type lookups can be told
//! apart from missing properties.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A single rich text run.
#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Plain text of the first run, if it is non-empty.
pub fn first_plain_text(runs: &[RichText]) -> Option<&str> {
    runs.first()
        .map(|run| run.plain_text.as_str())
        .filter(|text| !text.is_empty())
}

/// Value of a `date` property.
#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: String,
    pub end: Option<String>,
    /// IANA zone chosen in Notion; only set for naive date-times
    pub time_zone: Option<String>,
}

/// A page property value.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Date {
        date: Option<DateValue>,
    },
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    #[serde(other)]
    Other,
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Date { .. } => "date",
            PropertyValue::Title { .. } => "title",
            PropertyValue::Other => "another type",
        }
    }
}

/// Failed typed property lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property {0:?} not found")]
    NotFound(String),

    #[error("property {name:?} is {found}, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A fully resolved page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    /// Kept verbatim so it can be echoed back unchanged
    pub last_edited_time: String,
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Result<&PropertyValue, PropertyError> {
        self.properties
            .get(name)
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))
    }

    /// Date value of the named property. `Ok(None)` means the property is
    /// date-typed but empty.
    pub fn date_property(&self, name: &str) -> Result<Option<&DateValue>, PropertyError> {
        match self.property(name)? {
            PropertyValue::Date { date } => Ok(date.as_ref()),
            other => Err(PropertyError::WrongType {
                name: name.to_string(),
                expected: "date",
                found: other.type_name(),
            }),
        }
    }

    /// Title runs of the named property, or of the page's title property
    /// when no name is given.
    pub fn title_property(&self, name: Option<&str>) -> Result<&[RichText], PropertyError> {
        let Some(name) = name else {
            return self
                .properties
                .values()
                .find_map(|value| match value {
                    PropertyValue::Title { title } => Some(title.as_slice()),
                    _ => None,
                })
                .ok_or_else(|| PropertyError::NotFound("title".to_string()));
        };

        match self.property(name)? {
            PropertyValue::Title { title } => Ok(title),
            other => Err(PropertyError::WrongType {
                name: name.to_string(),
                expected: "title",
                found: other.type_name(),
            }),
        }
    }
}

/// A page stub carrying only its identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialPage {
    pub id: String,
}

/// Page as returned by the API: either fully resolved or a stub.
///
/// A page carrying `properties` is full; if it then fails to parse, the
/// serde error is kept rather than falling back to a stub.
#[derive(Debug, Clone)]
pub enum PageObject {
    Full(Page),
    Partial(PartialPage),
}

impl<'de> Deserialize<'de> for PageObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        resolve(deserializer, "properties", PageObject::Full, PageObject::Partial)
    }
}

impl PageObject {
    pub fn id(&self) -> &str {
        match self {
            PageObject::Full(page) => &page.id,
            PageObject::Partial(page) => &page.id,
        }
    }
}

/// A fully resolved database.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub id: String,
    pub title: Vec<RichText>,
}

/// A database stub carrying only its identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialDatabase {
    pub id: String,
}

/// Database as returned by the API: either fully resolved or a stub.
#[derive(Debug, Clone)]
pub enum DatabaseObject {
    Full(Database),
    Partial(PartialDatabase),
}

impl<'de> Deserialize<'de> for DatabaseObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        resolve(deserializer, "title", DatabaseObject::Full, DatabaseObject::Partial)
    }
}

/// Pick the full or partial shape by the presence of `marker`.
fn resolve<'de, D, F, P, T>(
    deserializer: D,
    marker: &str,
    full: fn(F) -> T,
    partial: fn(P) -> T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    F: DeserializeOwned,
    P: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.get(marker).is_some() {
        serde_json::from_value(value).map(full).map_err(D::Error::custom)
    } else {
        serde_json::from_value(value).map(partial).map_err(D::Error::custom)
    }
}

/// Body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Serialize)]
pub struct DatabaseQuery<'a> {
    pub filter: DateFilter<'a>,
    pub sorts: Vec<PropertySort<'a>>,
    pub page_size: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl<'a> DatabaseQuery<'a> {
    /// Pages where `property` is set, newest first.
    pub fn dated_descending(property: &'a str, start_cursor: Option<String>) -> Self {
        Self {
            filter: DateFilter {
                property,
                date: DateCondition { is_not_empty: true },
            },
            sorts: vec![PropertySort {
                property,
                direction: SortDirection::Descending,
            }],
            page_size: 100,
            start_cursor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DateFilter<'a> {
    pub property: &'a str,
    pub date: DateCondition,
}

#[derive(Debug, Serialize)]
pub struct DateCondition {
    pub is_not_empty: bool,
}

#[derive(Debug, Serialize)]
pub struct PropertySort<'a> {
    pub property: &'a str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Descending,
}

/// One page of query results.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A parsed Notion date boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionDate {
    /// `2024-01-15`
    Date(NaiveDate),
    /// `2024-01-15T10:00:00.000+02:00`
    Offset(DateTime<FixedOffset>),
    /// `2024-01-15T10:00:00.000`, optionally pinned to an IANA zone
    Local {
        date_time: NaiveDateTime,
        time_zone: Option<String>,
    },
}

impl NotionDate {
    pub fn parse(raw: &str, time_zone: Option<&str>) -> Result<Self, chrono::ParseError> {
        if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
            return Ok(NotionDate::Offset(date_time));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(NotionDate::Date(date));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|date_time| {
            NotionDate::Local {
                date_time,
                time_zone: time_zone.map(str::to_string),
            }
        })
    }

    /// Calendar date as written in Notion.
    pub fn date(&self) -> NaiveDate {
        match self {
            NotionDate::Date(date) => *date,
            NotionDate::Offset(date_time) => date_time.date_naive(),
            NotionDate::Local { date_time, .. } => date_time.date(),
        }
    }
}
