//! Calendar feed request handling.
//!
//! A request carries a `dbId` query parameter naming a Notion database. Every
//! page of that database whose date property is set becomes one event of the
//! returned iCalendar document. The feed is all-or-nothing: the first failure
//! turns the whole request into an error response.

use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{error, info, warn};

use crate::calendar::FeedCalendar;
use crate::fetcher::CollectionFetcher;
use crate::http::{calendar_response, text_response};
use crate::mapper::RowMapper;
use crate::notion::NotionClient;
use crate::{Config, Error, Result};

const MISSING_DB_ID: &str = "Missing dbId";
const GENERATION_FAILED: &str = "Error generating calendar";

/// Handle one feed request.
///
/// Failures never escape as `Err`; they are turned into 4xx/5xx responses.
pub async fn handle(
    config: &Config,
    http_client: &reqwest::Client,
    event: &Request,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    match generate(config, http_client, event).await {
        Ok(calendar) => calendar_response(calendar.name(), calendar.serialize()),
        Err(err) => {
            match &err {
                Error::Validation(_) => warn!("Rejected calendar request: {}", err),
                _ => error!("Error generating calendar: {}", err),
            }
            error_response(&err)
        }
    }
}

/// Build the calendar for the database named in the request.
pub async fn generate(
    config: &Config,
    http_client: &reqwest::Client,
    event: &Request,
) -> Result<FeedCalendar> {
    let token = config.require_token()?;
    let database_id = database_id(event)?;

    info!("Generating calendar for database {}", database_id);

    let client = NotionClient::new(http_client.clone(), config, token);
    let collection = CollectionFetcher::new(&client, config)
        .fetch(&database_id)
        .await?;

    let mut calendar = FeedCalendar::new(&collection.title);
    let mapper = RowMapper::new(config, &database_id);
    for row in &collection.rows {
        mapper.add_row(row, &mut calendar)?;
    }

    info!(
        "Generated calendar {:?} with {} events",
        calendar.name(),
        calendar.len()
    );

    Ok(calendar)
}

fn database_id(event: &Request) -> Result<String> {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first("dbId"))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Validation(MISSING_DB_ID.to_string()))
}

fn error_response(err: &Error) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let body = match err {
        Error::Config(message) | Error::Validation(message) => message.clone(),
        Error::Notion(api_error) => format!(
            "{}: {} {}",
            GENERATION_FAILED, api_error.code, api_error.message
        ),
        _ => GENERATION_FAILED.to_string(),
    };

    text_response(err.status_code(), body)
}
