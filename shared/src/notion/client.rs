//! Notion REST client.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::models::{DatabaseObject, DatabaseQuery, QueryResponse};
use crate::{Config, Error, Result};

/// Error object returned by the Notion API on non-2xx responses.
#[derive(Debug, Clone, Error, Deserialize, PartialEq, Eq)]
#[error("{status} {code}: {message}")]
pub struct NotionApiError {
    #[serde(default)]
    pub status: u16,
    pub code: String,
    pub message: String,
}

/// Client for the subset of the Notion API the feed uses.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
    version: String,
}

impl NotionClient {
    pub fn new(http_client: reqwest::Client, config: &Config, token: &str) -> Self {
        Self {
            http_client,
            base_url: config.notion_api_url.clone(),
            token: token.to_string(),
            version: config.notion_version.clone(),
        }
    }

    /// Retrieve database metadata.
    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseObject> {
        let url = format!(
            "{}/v1/databases/{}",
            self.base_url,
            urlencoding::encode(database_id)
        );
        debug!("GET {}", url);

        self.send(self.http_client.get(&url)).await
    }

    /// Run one page of a database query.
    pub async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery<'_>,
    ) -> Result<QueryResponse> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.base_url,
            urlencoding::encode(database_id)
        );
        debug!("POST {} (cursor: {:?})", url, query.start_cursor);

        self.send(self.http_client.post(&url).json(query)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn api_error(status: StatusCode, body: String) -> Error {
    match serde_json::from_str::<NotionApiError>(&body) {
        Ok(mut api_error) => {
            if api_error.status == 0 {
                api_error.status = status.as_u16();
            }
            Error::Notion(api_error)
        }
        Err(_) => Error::UnexpectedResponse {
            status: status.as_u16(),
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_api_error() {
        let body = r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#;
        match api_error(StatusCode::UNAUTHORIZED, body.to_string()) {
            Error::Notion(err) => {
                assert_eq!(err.status, 401);
                assert_eq!(err.code, "unauthorized");
                assert_eq!(err.message, "API token is invalid.");
            }
            other => panic!("expected a Notion error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_filled_from_response() {
        let body = r#"{"code":"rate_limited","message":"slow down"}"#;
        match api_error(StatusCode::TOO_MANY_REQUESTS, body.to_string()) {
            Error::Notion(err) => assert_eq!(err.status, 429),
            other => panic!("expected a Notion error, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_error_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>".to_string());
        assert!(matches!(err, Error::UnexpectedResponse { status: 502, .. }));
    }
}
