//! Error types for the calendar feed.

use thiserror::Error;

use crate::notion::NotionApiError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a calendar feed.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error on the inbound request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error returned by the Notion API
    #[error("Notion API error: {0}")]
    Notion(#[from] NotionApiError),

    /// Transport-level failure talking to Notion
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion answered with something we could not interpret
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// Database metadata came back as a partial object
    #[error("Database {0} is not fully resolved")]
    UnresolvedCollection(String),

    /// A fetched page does not have the expected shape
    #[error("Malformed row {page_id}: {reason}")]
    MalformedRow { page_id: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            _ => 500,
        }
    }

    pub(crate) fn malformed_row(page_id: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRow {
            page_id: page_id.to_string(),
            reason: reason.into(),
        }
    }
}
