use std::collections::BTreeMap;

use super::tfidf::SparseVec;

/// Multinomial naive Bayes over non-negative feature rows.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit with additive smoothing `alpha`. Classes are kept in lexicographic order.
    pub fn fit(rows: &[SparseVec], labels: &[&str], n_features: usize, alpha: f64) -> Self {
        let mut by_class: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (row, label) in rows.iter().zip(labels) {
            let (count, features) = by_class
                .entry(*label)
                .or_insert_with(|| (0, vec![0.0; n_features]));
            *count += 1;
            for &(i, w) in row {
                features[i] += w;
            }
        }

        let total = rows.len() as f64;
        let mut classes = Vec::with_capacity(by_class.len());
        let mut class_log_prior = Vec::with_capacity(by_class.len());
        let mut feature_log_prob = Vec::with_capacity(by_class.len());
        for (label, (count, features)) in by_class {
            let denom = (features.iter().sum::<f64>() + alpha * n_features as f64).ln();
            classes.push(label.to_string());
            class_log_prior.push((count as f64 / total).ln());
            feature_log_prob.push(features.iter().map(|f| (f + alpha).ln() - denom).collect());
        }

        MultinomialNb {
            classes,
            class_log_prior,
            feature_log_prob,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Most likely class; ties go to the earliest class.
    pub fn predict(&self, row: &SparseVec) -> &str {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (c, prior) in self.class_log_prior.iter().enumerate() {
            let score = prior
                + row
                    .iter()
                    .map(|&(i, w)| w * self.feature_log_prob[c][i])
                    .sum::<f64>();
            if score > best_score {
                best = c;
                best_score = score;
            }
        }
        &self.classes[best]
    }
}
