//! Notion API client and wire types.

pub mod client;
pub mod models;

pub use client::{NotionApiError, NotionClient};
pub use models::{
    first_plain_text, DatabaseObject, DatabaseQuery, DateValue, NotionDate, Page, PageObject,
    PropertyError, PropertyValue, QueryResponse, RichText,
};
