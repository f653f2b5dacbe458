//! Calendar Feed Lambda - Serves a Notion database as an iCalendar feed.
//!
//! Endpoint:
//! - ANY /?dbId={database_id} - Dated pages of the database as `text/calendar`

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{feed, Config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    config: Config,
    http_client: reqwest::Client,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        let config = Config::from_env();

        // Requests answer 500 until the token is configured.
        if config.notion_token.is_none() {
            error!("Missing NOTION_TOKEN env variable");
        }

        info!(
            "Serving Notion calendars (date property: {}, organisation: {:?})",
            config.date_property, config.organisation
        );

        Ok(Self {
            config,
            http_client: reqwest::Client::builder().build()?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    info!("Calendar request: {} {}", event.method(), event.uri().path());

    feed::handle(&state.config, &state.http_client, &event).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new()?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
