//! Configuration management for the calendar feed Lambda.

use std::env;

use crate::{Error, Result};

const DEFAULT_DATE_PROPERTY: &str = "Due";
const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Application configuration loaded from environment variables.
///
/// Built once at start-up and passed by reference into the request handler.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token
    pub notion_token: Option<String>,
    /// Workspace namespace used when building page links
    pub organisation: String,
    /// Date property used for filtering, sorting and event boundaries
    pub date_property: String,
    /// Title property override; the page's title-typed property when unset
    pub title_property: Option<String>,
    /// Base URL of the Notion REST API
    pub notion_api_url: String,
    /// Value sent in the `Notion-Version` header
    pub notion_version: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            notion_token: var("NOTION_TOKEN"),
            organisation: var("NOTION_ORGANISATION").unwrap_or_default(),
            date_property: var("DATE_PROPERTY_NAME")
                .unwrap_or_else(|| DEFAULT_DATE_PROPERTY.to_string()),
            title_property: var("TITLE_PROPERTY_NAME"),
            notion_api_url: var("NOTION_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
            notion_version: var("NOTION_VERSION")
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
        }
    }

    /// The Notion token, or a configuration error when it is missing.
    pub fn require_token(&self) -> Result<&str> {
        self.notion_token
            .as_deref()
            .ok_or_else(|| Error::Config("Missing NOTION_TOKEN env variable".to_string()))
    }
}
