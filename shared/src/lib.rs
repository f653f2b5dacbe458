//! Shared library for the Notion calendar feed Lambda.
//!
//! This crate turns a Notion database into an iCalendar feed: it queries the
//! Notion API, maps dated pages onto events and serves the result over
//! `lambda_http`.

pub mod calendar;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod http;
pub mod link;
pub mod mapper;
pub mod notion;

pub use calendar::{EventDetails, FeedCalendar};
pub use config::Config;
pub use error::{Error, Result};
pub use fetcher::{Collection, CollectionFetcher};
pub use mapper::{NormalizedEvent, RowMapper};
pub use notion::{NotionApiError, NotionClient};
