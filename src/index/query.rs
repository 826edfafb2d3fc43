use serde_json::{json, Value};

/// Field name plus relevance boost, rendered as `field^boost`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedField {
    pub field: String,
    pub boost: f64,
}

impl BoostedField {
    pub fn new(field: &str, boost: f64) -> Self {
        BoostedField {
            field: field.to_string(),
            boost,
        }
    }

    fn render(&self) -> String {
        if self.boost == 1.0 {
            self.field.clone()
        } else {
            format!("{}^{}", self.field, self.boost)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    /// Full-text match across several fields with per-field weighting.
    MultiMatch {
        query: String,
        fields: Vec<BoostedField>,
    },
    /// Full-text match on one field.
    Match { field: String, query: String },
    /// Exact match on a keyword field.
    Term { field: String, value: String },
}

impl Query {
    /// Title weighted twice as heavily as description.
    pub fn listing_text(text: &str) -> Self {
        Query::MultiMatch {
            query: text.to_string(),
            fields: vec![BoostedField::new("title", 2.0), BoostedField::new("description", 1.0)],
        }
    }

    /// Elasticsearch query DSL for the `query` clause.
    pub fn to_dsl(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::MultiMatch { query, fields } => json!({
                "multi_match": {
                    "query": query,
                    "fields": fields.iter().map(BoostedField::render).collect::<Vec<_>>(),
                }
            }),
            Query::Match { field, query } => json!({ "match": { field.as_str(): query } }),
            Query::Term { field, value } => json!({ "term": { field.as_str(): value } }),
        }
    }
}
