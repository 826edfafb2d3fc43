use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Lowercased runs of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sparse row: (feature index, weight), sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

/// Term-frequency × smoothed inverse-document-frequency, L2-normalised.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(texts: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();

        // Document frequency per term; BTreeMap gives sorted feature order.
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term).or_default() += 1;
            }
        }

        let n = texts.len() as f64;
        let mut vocabulary = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (i, (term, count)) in df.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), i);
            idf.push(((1.0 + n) / (1.0 + count as f64)).ln() + 1.0);
        }

        TfidfVectorizer { vocabulary, idf }
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&i) = self.vocabulary.get(&token) {
                *counts.entry(i).or_default() += 1.0;
            }
        }

        let mut row: SparseVec = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }
}
