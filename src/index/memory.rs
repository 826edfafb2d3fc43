use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Hit, IndexError, IndexResult, IndexSchema, Query, ScrollPage, SearchBackend};
use crate::classify::tfidf::tokenize;
use crate::document::ListingDocument;

/// Search backend kept entirely in memory, for tests.
#[derive(Default)]
pub struct InMemoryIndex {
    indices: Mutex<HashMap<String, Vec<Hit>>>,
    cursors: Mutex<HashMap<String, Cursor>>,
    next_cursor: AtomicUsize,
    scroll_calls: AtomicUsize,
}

struct Cursor {
    hits: Vec<Hit>,
    offset: usize,
    size: usize,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `scroll` continuations served so far.
    pub fn scroll_calls(&self) -> usize {
        self.scroll_calls.load(Ordering::SeqCst)
    }

    pub fn open_cursors(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }

    fn matching(&self, index: &str, query: &Query) -> IndexResult<Vec<Hit>> {
        let indices = self.indices.lock().unwrap();
        let docs = indices
            .get(index)
            .ok_or_else(|| IndexError::Missing(index.to_string()))?;
        let mut hits: Vec<Hit> = docs
            .iter()
            .filter_map(|hit| {
                let score = score(query, &hit.source)?;
                Some(Hit {
                    score: Some(score),
                    ..hit.clone()
                })
            })
            .collect();
        // Stable: equal scores keep insertion order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }

    fn page(&self, cursor_id: String) -> IndexResult<ScrollPage> {
        let mut cursors = self.cursors.lock().unwrap();
        let cursor = cursors
            .get_mut(&cursor_id)
            .ok_or_else(|| IndexError::UnknownCursor(cursor_id.clone()))?;
        let end = (cursor.offset + cursor.size).min(cursor.hits.len());
        let hits = cursor.hits[cursor.offset..end].to_vec();
        cursor.offset = end;
        Ok(ScrollPage {
            cursor: cursor_id,
            hits,
        })
    }
}

fn field<'a>(doc: &'a ListingDocument, name: &str) -> &'a str {
    match name {
        "title" => &doc.title,
        "description" => &doc.description,
        "url" => &doc.url,
        "category" => &doc.category,
        _ => "",
    }
}

fn overlap(query: &str, text: &str) -> usize {
    let terms = tokenize(text);
    tokenize(query).iter().filter(|t| terms.contains(t)).count()
}

fn score(query: &Query, doc: &ListingDocument) -> Option<f64> {
    let s = match query {
        Query::MatchAll => 1.0,
        Query::Term { field: name, value } => {
            return (field(doc, name) == value).then_some(1.0)
        }
        Query::Match { field: name, query } => overlap(query, field(doc, name)) as f64,
        Query::MultiMatch { query, fields } => fields
            .iter()
            .map(|f| f.boost * overlap(query, field(doc, &f.field)) as f64)
            .sum::<f64>(),
    };
    (s > 0.0).then_some(s)
}

impl SearchBackend for InMemoryIndex {
    async fn index_exists(&self, index: &str) -> IndexResult<bool> {
        Ok(self.indices.lock().unwrap().contains_key(index))
    }

    async fn delete_index(&self, index: &str) -> IndexResult<()> {
        self.indices
            .lock()
            .unwrap()
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| IndexError::Missing(index.to_string()))
    }

    async fn create_index(&self, index: &str, _schema: &IndexSchema) -> IndexResult<()> {
        let mut indices = self.indices.lock().unwrap();
        if indices.contains_key(index) {
            return Err(IndexError::AlreadyExists(index.to_string()));
        }
        indices.insert(index.to_string(), Vec::new());
        Ok(())
    }

    async fn index_document(&self, index: &str, doc: &ListingDocument) -> IndexResult<()> {
        let mut indices = self.indices.lock().unwrap();
        let docs = indices
            .get_mut(index)
            .ok_or_else(|| IndexError::Missing(index.to_string()))?;
        docs.push(Hit {
            score: None,
            source: doc.clone(),
        });
        Ok(())
    }

    async fn refresh(&self, index: &str) -> IndexResult<()> {
        if self.index_exists(index).await? {
            Ok(())
        } else {
            Err(IndexError::Missing(index.to_string()))
        }
    }

    async fn count(&self, index: &str) -> IndexResult<u64> {
        let indices = self.indices.lock().unwrap();
        indices
            .get(index)
            .map(|docs| docs.len() as u64)
            .ok_or_else(|| IndexError::Missing(index.to_string()))
    }

    async fn search(&self, index: &str, query: &Query, size: usize) -> IndexResult<Vec<Hit>> {
        let mut hits = self.matching(index, query)?;
        hits.truncate(size);
        Ok(hits)
    }

    async fn open_scroll(
        &self,
        index: &str,
        query: &Query,
        size: usize,
        _keep_alive: &str,
    ) -> IndexResult<ScrollPage> {
        let hits = self.matching(index, query)?;
        let cursor_id = format!("cursor-{}", self.next_cursor.fetch_add(1, Ordering::SeqCst));
        self.cursors.lock().unwrap().insert(
            cursor_id.clone(),
            Cursor {
                hits,
                offset: 0,
                size,
            },
        );
        self.page(cursor_id)
    }

    async fn scroll(&self, cursor: &str, _keep_alive: &str) -> IndexResult<ScrollPage> {
        self.scroll_calls.fetch_add(1, Ordering::SeqCst);
        self.page(cursor.to_string())
    }

    async fn clear_scroll(&self, cursor: &str) -> IndexResult<()> {
        self.cursors.lock().unwrap().remove(cursor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, description: &str, category: &str) -> ListingDocument {
        ListingDocument {
            title: title.into(),
            description: description.into(),
            url: format!("https://site/{}/", title.to_lowercase().replace(' ', "-")),
            category: category.into(),
        }
    }

    async fn seeded() -> InMemoryIndex {
        let store = InMemoryIndex::new();
        store.create_index("courses", &IndexSchema::listings()).await.unwrap();
        for d in [
            doc("Health basics", "sleep and nutrition", "health"),
            doc("Algebra", "health of equations", "math"),
            doc("Cell biology", "cells and tissue", "biology"),
        ] {
            store.index_document("courses", &d).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn multi_match_prefers_title() {
        let store = seeded().await;
        let hits = store
            .search("courses", &Query::listing_text("health"), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source.title, "Health basics");
        assert_eq!(hits[0].score, Some(2.0));
    }

    #[tokio::test]
    async fn term_is_exact() {
        let store = seeded().await;
        let hit = Query::Term {
            field: "url".into(),
            value: "https://site/algebra/".into(),
        };
        assert_eq!(store.search("courses", &hit, 10).await.unwrap().len(), 1);
        let miss = Query::Term {
            field: "url".into(),
            value: "https://site/algebra".into(),
        };
        assert!(store.search("courses", &miss, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scroll_pages_until_empty() {
        let store = seeded().await;
        let first = store
            .open_scroll("courses", &Query::MatchAll, 2, "1m")
            .await
            .unwrap();
        assert_eq!(first.hits.len(), 2);
        let second = store.scroll(&first.cursor, "1m").await.unwrap();
        assert_eq!(second.hits.len(), 1);
        let third = store.scroll(&second.cursor, "1m").await.unwrap();
        assert!(third.hits.is_empty());
        assert_eq!(store.scroll_calls(), 2);

        store.clear_scroll(&first.cursor).await.unwrap();
        assert_eq!(store.open_cursors(), 0);
        assert!(matches!(
            store.scroll(&first.cursor, "1m").await,
            Err(IndexError::UnknownCursor(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = seeded().await;
        let err = store
            .create_index("courses", &IndexSchema::listings())
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::AlreadyExists(_)));
    }
}
