pub mod elastic;
pub mod handle;
#[cfg(test)]
pub mod memory;
pub mod query;
pub mod retrieve;

use serde_json::{json, Value};

use crate::document::ListingDocument;
pub use query::Query;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search backend returned {status} on {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("malformed search backend response: {0}")]
    Decode(String),
    #[error("index {0} not found")]
    Missing(String),
    #[error("index {0} already exists")]
    AlreadyExists(String),
    #[error("unknown scroll cursor {0}")]
    UnknownCursor(String),
    #[error("invalid search backend url: {0}")]
    Url(#[from] url::ParseError),
}

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Analyzed full-text field.
    Text,
    /// Exact-match field.
    Keyword,
}

impl FieldKind {
    fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Keyword => "keyword",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    pub shards: u32,
    pub replicas: u32,
    pub fields: Vec<(String, FieldKind)>,
}

impl IndexSchema {
    /// Listing schema. `category` is full-text, so labels must be compared by
    /// string equality downstream rather than through search.
    pub fn listings() -> Self {
        IndexSchema {
            shards: 1,
            replicas: 0,
            fields: vec![
                ("title".into(), FieldKind::Text),
                ("description".into(), FieldKind::Text),
                ("url".into(), FieldKind::Keyword),
                ("category".into(), FieldKind::Text),
            ],
        }
    }

    /// Index creation body: settings + mappings.
    pub fn to_body(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, kind)| (name.clone(), json!({ "type": kind.as_str() })))
            .collect();
        json!({
            "settings": {
                "number_of_shards": self.shards,
                "number_of_replicas": self.replicas,
            },
            "mappings": { "properties": properties },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub score: Option<f64>,
    pub source: ListingDocument,
}

/// One page of a scroll. `cursor` is handed back to continue.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub cursor: String,
    pub hits: Vec<Hit>,
}

/// Operations consumed from the search engine.
pub trait SearchBackend {
    async fn index_exists(&self, index: &str) -> IndexResult<bool>;

    async fn delete_index(&self, index: &str) -> IndexResult<()>;

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> IndexResult<()>;

    /// Store one document. No uniqueness is enforced.
    async fn index_document(&self, index: &str, doc: &ListingDocument) -> IndexResult<()>;

    /// Make every written document visible to search.
    async fn refresh(&self, index: &str) -> IndexResult<()>;

    async fn count(&self, index: &str) -> IndexResult<u64>;

    async fn search(&self, index: &str, query: &Query, size: usize) -> IndexResult<Vec<Hit>>;

    async fn open_scroll(
        &self,
        index: &str,
        query: &Query,
        size: usize,
        keep_alive: &str,
    ) -> IndexResult<ScrollPage>;

    async fn scroll(&self, cursor: &str, keep_alive: &str) -> IndexResult<ScrollPage>;

    async fn clear_scroll(&self, cursor: &str) -> IndexResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_schema_body() {
        let body = IndexSchema::listings().to_body();
        assert_eq!(body["settings"]["number_of_shards"], 1);
        assert_eq!(body["settings"]["number_of_replicas"], 0);
        let props = &body["mappings"]["properties"];
        assert_eq!(props["title"]["type"], "text");
        assert_eq!(props["description"]["type"], "text");
        assert_eq!(props["url"]["type"], "keyword");
        assert_eq!(props["category"]["type"], "text");
    }
}
