//! Shareable Notion page links.

/// Build the public link of a page inside a database.
///
/// Page ids are dashed UUIDs in the API but dash-less in Notion URLs.
pub fn page_url(organisation: &str, database_id: &str, page_id: &str) -> String {
    let page = page_id.replace('-', "");

    if organisation.is_empty() {
        format!("https://notion.so/{}?p={}", database_id, page)
    } else {
        format!("https://notion.so/{}/{}?p={}", organisation, database_id, page)
    }
}
