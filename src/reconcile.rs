use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::classify::TrainedClassifier;
use crate::document::ListingDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRecord {
    pub title: String,
    pub url: String,
    pub real_category: String,
    pub predicted_category: String,
    pub is_correct: bool,
}

/// Predict every document's category and compare it with the stored one.
/// Output follows corpus order; nothing is aggregated.
pub fn reconcile(
    classifier: &TrainedClassifier,
    corpus: &[ListingDocument],
) -> Vec<ReconciliationRecord> {
    corpus
        .iter()
        .map(|doc| {
            let predicted = classifier.predict(&doc.description);
            ReconciliationRecord {
                title: doc.title.clone(),
                url: doc.url.clone(),
                real_category: doc.category.clone(),
                predicted_category: predicted.to_string(),
                is_correct: predicted == doc.category,
            }
        })
        .collect()
}

/// Five lines per record, blank line after each block.
pub fn render_report(records: &[ReconciliationRecord]) -> String {
    let mut out = String::new();
    for r in records {
        // Writing into a String can't fail.
        let _ = write!(
            out,
            "Title: {}\nURL: {}\nReal Category: {}\nPredicted Category: {}\nCorrect: {}\n\n",
            r.title, r.url, r.real_category, r.predicted_category, r.is_correct
        );
    }
    out
}

pub fn write_report(path: &Path, records: &[ReconciliationRecord]) -> Result<()> {
    std::fs::write(path, render_report(records))
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
