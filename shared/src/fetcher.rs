//! Database retrieval: metadata plus every dated page.

use tracing::{error, info};

use crate::calendar::UNTITLED;
use crate::notion::{first_plain_text, DatabaseObject, DatabaseQuery, NotionClient, PageObject};
use crate::{Config, Error, Result};

/// A database title and its dated pages in server order.
#[derive(Debug)]
pub struct Collection {
    pub title: String,
    pub rows: Vec<PageObject>,
}

pub struct CollectionFetcher<'a> {
    client: &'a NotionClient,
    config: &'a Config,
}

impl<'a> CollectionFetcher<'a> {
    pub fn new(client: &'a NotionClient, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// Fetch database metadata and all pages whose date property is set,
    /// newest first. No retries: the first failure is returned.
    pub async fn fetch(&self, database_id: &str) -> Result<Collection> {
        self.fetch_collection(database_id).await.map_err(|e| {
            error!("Failed to fetch database {}: {}", database_id, e);
            e
        })
    }

    async fn fetch_collection(&self, database_id: &str) -> Result<Collection> {
        let title = match self.client.retrieve_database(database_id).await? {
            DatabaseObject::Full(database) => first_plain_text(&database.title)
                .unwrap_or(UNTITLED)
                .to_string(),
            DatabaseObject::Partial(database) => {
                return Err(Error::UnresolvedCollection(database.id))
            }
        };

        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let query = DatabaseQuery::dated_descending(&self.config.date_property, cursor.take());
            let page = self.client.query_database(database_id, &query).await?;
            rows.extend(page.results);

            cursor = page.next_cursor;
            if !page.has_more || cursor.is_none() {
                break;
            }
        }

        info!(
            "Fetched {} dated pages from database {} ({})",
            rows.len(),
            database_id,
            title
        );

        Ok(Collection { title, rows })
    }
}
