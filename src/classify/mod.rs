pub mod bayes;
pub mod tfidf;

use itertools::Itertools;
use tracing::{debug, info};

use crate::document::ListingDocument;
use bayes::MultinomialNb;
use tfidf::TfidfVectorizer;

const ALPHA: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("need at least 2 documents to split, got {0}")]
    TooFewDocuments(usize),
    #[error("need at least 2 distinct categories, got {0}")]
    TooFewCategories(usize),
    #[error("test ratio must be between 0 and 1, got {0}")]
    InvalidTestRatio(f64),
    #[error("training descriptions contain no usable terms")]
    EmptyVocabulary,
}

/// How the corpus is partitioned. Same corpus order + same seed ⇒ same split.
#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Shuffled (train, test) index partitions of `0..n`.
pub fn train_test_split(n: usize, split: &SplitConfig) -> (Vec<usize>, Vec<usize>) {
    let n_test = if n < 2 {
        0
    } else {
        ((split.test_ratio * n as f64).ceil() as usize).clamp(1, n - 1)
    };
    let mut indices: Vec<usize> = (0..n).collect();
    fastrand::Rng::with_seed(split.seed).shuffle(&mut indices);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Fitted vectorizer + classifier pair.
#[derive(Debug, Clone)]
pub struct TrainedClassifier {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

impl TrainedClassifier {
    pub fn fit(texts: &[&str], labels: &[&str]) -> Result<Self, TrainingError> {
        let vectorizer = TfidfVectorizer::fit(texts);
        if vectorizer.n_features() == 0 {
            return Err(TrainingError::EmptyVocabulary);
        }
        let rows: Vec<_> = texts.iter().map(|t| vectorizer.transform(t)).collect();
        let model = MultinomialNb::fit(&rows, labels, vectorizer.n_features(), ALPHA);
        Ok(TrainedClassifier { vectorizer, model })
    }

    pub fn predict(&self, text: &str) -> &str {
        self.model.predict(&self.vectorizer.transform(text))
    }

    pub fn categories(&self) -> &[String] {
        self.model.classes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Exact-match accuracy on the held-out partition.
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
}

/// Fit on descriptions → categories and score on the held-out split.
///
/// The corpus must hold at least 2 documents spanning at least 2 categories.
/// Accuracy is reported, never used to reject the model.
pub fn train(
    corpus: &[ListingDocument],
    split: &SplitConfig,
) -> Result<(TrainedClassifier, Evaluation), TrainingError> {
    if !(split.test_ratio > 0.0 && split.test_ratio < 1.0) {
        return Err(TrainingError::InvalidTestRatio(split.test_ratio));
    }
    if corpus.len() < 2 {
        return Err(TrainingError::TooFewDocuments(corpus.len()));
    }
    let distinct = corpus.iter().map(|d| d.category.as_str()).unique().count();
    if distinct < 2 {
        return Err(TrainingError::TooFewCategories(distinct));
    }

    let texts: Vec<&str> = corpus.iter().map(|d| d.description.as_str()).collect();
    let labels: Vec<&str> = corpus.iter().map(|d| d.category.as_str()).collect();
    let (train_idx, test_idx) = train_test_split(corpus.len(), split);

    let classifier = TrainedClassifier::fit(&pick(&texts, &train_idx), &pick(&labels, &train_idx))?;
    debug!("Categories seen in training: {:?}", classifier.categories());

    let correct = test_idx
        .iter()
        .filter(|&&i| classifier.predict(texts[i]) == labels[i])
        .count();
    let evaluation = Evaluation {
        accuracy: correct as f64 / test_idx.len() as f64,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
    };
    info!(
        "Trained on {} documents, {}/{} held-out correct",
        evaluation.train_size, correct, evaluation.test_size
    );

    Ok((classifier, evaluation))
}

fn pick<'a>(values: &[&'a str], idx: &[usize]) -> Vec<&'a str> {
    idx.iter().map(|&i| values[i]).collect()
}
