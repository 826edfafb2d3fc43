use tracing::{debug, warn};

use super::{IndexResult, Query, SearchBackend};
use crate::document::ListingDocument;

/// Read documents back with a scroll cursor, keeping at most `cap`.
///
/// Stops on the first empty page or once `cap` documents are held; no
/// further cursor calls are made after either. Page order is preserved.
pub async fn retrieve<B: SearchBackend>(
    backend: &B,
    index: &str,
    query: &Query,
    page_size: usize,
    cap: usize,
    keep_alive: &str,
) -> IndexResult<Vec<ListingDocument>> {
    let first = backend.open_scroll(index, query, page_size, keep_alive).await?;
    let mut cursor = first.cursor;
    let mut exhausted = first.hits.is_empty();
    let mut docs: Vec<ListingDocument> = first.hits.into_iter().map(|h| h.source).collect();
    let mut pages = 1;
    let mut failure = None;

    while !exhausted && docs.len() < cap {
        match backend.scroll(&cursor, keep_alive).await {
            Ok(page) => {
                pages += 1;
                cursor = page.cursor;
                exhausted = page.hits.is_empty();
                docs.extend(page.hits.into_iter().map(|h| h.source));
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    // Released even when paging failed.
    if let Err(e) = backend.clear_scroll(&cursor).await {
        warn!("Failed to clear scroll cursor: {}", e);
    }
    if let Some(e) = failure {
        return Err(e);
    }

    docs.truncate(cap);
    debug!("Retrieved {} documents in {} pages", docs.len(), pages);
    Ok(docs)
}
