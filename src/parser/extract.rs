use url::Url;

use super::anchors::NearestAnchorLookup;
use crate::document::ListingDocument;

pub const UNKNOWN_CATEGORY: &str = "Unknown category";
pub const NO_DESCRIPTION: &str = "No description available";

/// Resolve `href` against the page URL. Absolute hrefs pass through; anything
/// that can't be joined is returned as-is.
pub fn resolve_url(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(u) => u.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Category = text of the nearest anchor before the listing.
pub fn infer_category(page: &impl NearestAnchorLookup, pos: usize) -> String {
    page.preceding(pos)
        .map(|a| a.text.clone())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Description = text of the next anchor, but only when it points at the same
/// destination as the listing itself.
pub fn infer_description(
    page: &impl NearestAnchorLookup,
    pos: usize,
    base: &str,
    listing_url: &str,
) -> String {
    page.following(pos)
        .and_then(|a| {
            let href = a.href.as_deref()?;
            (resolve_url(base, href) == listing_url).then(|| a.text.clone())
        })
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Build the document for the listing anchor at `pos`. Never fails; missing
/// structure turns into placeholder text.
pub fn extract_listing(page: &impl NearestAnchorLookup, pos: usize, base: &str) -> ListingDocument {
    let (title, href) = match page.anchor(pos) {
        Some(a) => (a.text.clone(), a.href.clone().unwrap_or_default()),
        None => (String::new(), String::new()),
    };
    let url = resolve_url(base, &href);

    ListingDocument {
        description: infer_description(page, pos, base, &url),
        category: infer_category(page, pos),
        title,
        url,
    }
}
