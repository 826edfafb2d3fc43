pub mod anchors;
pub mod extract;

use tracing::debug;

use crate::document::ListingDocument;
use anchors::PageAnchors;

/// Two-step extraction: HTML → anchor sequence → one document per listing anchor.
pub fn extract_page(html: &str, base_url: &str) -> Vec<ListingDocument> {
    let page = PageAnchors::parse(html);
    let positions = page.listing_positions();
    debug!(
        "{}: {} anchors, {} listings",
        base_url,
        page.len(),
        positions.len()
    );
    positions
        .into_iter()
        .map(|pos| extract::extract_listing(&page, pos, base_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{NO_DESCRIPTION, UNKNOWN_CATEGORY};

    #[test]
    fn category_page() {
        let html = r#"
            <a rel="bookmark" href="/orphan/">Orphan post</a>
            <a href="/category/programming/">Programming</a>
            <a rel="bookmark" href="/rust-intro/">Rust intro</a>
            <a href="/rust-intro/">Ownership and borrowing explained</a>
            <a href="/category/programming/">Programming</a>
            <a rel="bookmark" href="https://cdn.site/go-intro/">Go intro</a>
            <a href="/elsewhere/">Read more</a>
        "#;
        let docs = extract_page(html, "https://blog.site/category/programming/");
        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0].title, "Orphan post");
        assert_eq!(docs[0].category, UNKNOWN_CATEGORY);
        assert_eq!(docs[0].description, NO_DESCRIPTION);

        assert_eq!(docs[1].url, "https://blog.site/rust-intro/");
        assert_eq!(docs[1].category, "Programming");
        assert_eq!(docs[1].description, "Ownership and borrowing explained");

        assert_eq!(docs[2].url, "https://cdn.site/go-intro/");
        assert_eq!(docs[2].description, NO_DESCRIPTION);
    }
}
