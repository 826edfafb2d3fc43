use serde::{Deserialize, Serialize};

/// One course listing as stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDocument {
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
}
