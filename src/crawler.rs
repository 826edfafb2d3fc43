use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::document::ListingDocument;
use crate::parser;

/// Build the shared HTTP client used for category pages.
pub fn http_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch one category page and extract its listings in document order.
///
/// A category that can't be fetched (non-success status, connection error,
/// unreadable body) yields no documents. It is never retried.
pub async fn crawl(client: &reqwest::Client, category_url: &str) -> Vec<ListingDocument> {
    let html = match fetch_page(client, category_url).await {
        Ok(Some(html)) => html,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Skipping category {}: {:#}", category_url, e);
            return Vec::new();
        }
    };

    let docs = parser::extract_page(&html, category_url);
    info!("Found {} listings in {}", docs.len(), category_url);
    docs
}

/// `Ok(None)` for a non-success status.
async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<Option<String>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!("Skipping category {}: HTTP {}", url, status);
        return Ok(None);
    }
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;
    Ok(Some(body))
}
