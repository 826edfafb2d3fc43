use std::sync::LazyLock;

use scraper::{Html, Selector};

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// A single `<a>` element, flattened out of the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub text: String,
    pub rel: Vec<String>,
}

impl Anchor {
    /// Listing anchors carry `rel="bookmark"` and an href.
    pub fn is_listing(&self) -> bool {
        self.href.is_some() && self.rel.iter().any(|r| r.eq_ignore_ascii_case("bookmark"))
    }
}

/// Positional access to the anchors of a page, in document order.
pub trait NearestAnchorLookup {
    fn anchor(&self, pos: usize) -> Option<&Anchor>;

    /// Nearest anchor before `pos`, regardless of nesting.
    fn preceding(&self, pos: usize) -> Option<&Anchor> {
        pos.checked_sub(1).and_then(|p| self.anchor(p))
    }

    /// Nearest anchor after `pos`, regardless of nesting.
    fn following(&self, pos: usize) -> Option<&Anchor> {
        self.anchor(pos + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageAnchors {
    anchors: Vec<Anchor>,
}

impl PageAnchors {
    #[cfg(test)]
    pub fn new(anchors: Vec<Anchor>) -> Self {
        PageAnchors { anchors }
    }

    /// Parse an HTML document and collect every `<a>` in document order.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let anchors = doc
            .select(&ANCHOR)
            .map(|el| {
                let value = el.value();
                Anchor {
                    href: value.attr("href").map(str::to_string),
                    text: el.text().collect::<String>().trim().to_string(),
                    rel: value
                        .attr("rel")
                        .map(|r| r.split_whitespace().map(str::to_string).collect())
                        .unwrap_or_default(),
                }
            })
            .collect();
        PageAnchors { anchors }
    }

    /// Positions of listing anchors, in document order.
    pub fn listing_positions(&self) -> Vec<usize> {
        self.anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_listing())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }
}

impl NearestAnchorLookup for PageAnchors {
    fn anchor(&self, pos: usize) -> Option<&Anchor> {
        self.anchors.get(pos)
    }
}
