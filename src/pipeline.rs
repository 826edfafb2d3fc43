use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::classify::{self, Evaluation};
use crate::settings::Settings;
use crate::crawler;
use crate::index::handle::IndexHandle;
use crate::index::retrieve::retrieve;
use crate::index::{IndexSchema, Query, SearchBackend};
use crate::reconcile::{self, ReconciliationRecord};

#[derive(Debug)]
pub struct RunSummary {
    pub indexed: usize,
    pub corpus: usize,
    pub evaluation: Evaluation,
    pub records: Vec<ReconciliationRecord>,
}

impl RunSummary {
    pub fn correct(&self) -> usize {
        self.records.iter().filter(|r| r.is_correct).count()
    }
}

/// Reset → crawl + index every category → read back → train → reconcile → close → report.
///
/// Every step runs in order on the calling task. Backend and training
/// failures abort before the report is written.
pub async fn run<B: SearchBackend>(
    settings: &Settings,
    http: &reqwest::Client,
    backend: B,
) -> Result<RunSummary> {
    let mut index = IndexHandle::open(backend, &settings.index_name, IndexSchema::listings())
        .await
        .with_context(|| format!("Failed to reset index {}", settings.index_name))?;

    let pb = ProgressBar::new(settings.category_urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} categories ({msg})")?
            .progress_chars("=> "),
    );
    for url in &settings.category_urls {
        pb.set_message(url.clone());
        for doc in crawler::crawl(http, url).await {
            index.write(&doc).await.context("Failed to index listing")?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    index.flush().await.context("Failed to refresh index")?;
    info!("Indexed {} listings", index.written());

    let corpus = retrieve(
        index.backend(),
        index.name(),
        &Query::MatchAll,
        settings.page_size,
        settings.corpus_cap,
        &settings.scroll_keep_alive,
    )
    .await
    .context("Failed to read listings back from the index")?;
    info!("Retrieved corpus of {} listings", corpus.len());

    let (classifier, evaluation) =
        classify::train(&corpus, &settings.split()).context("Failed to train classifier")?;
    println!("Model accuracy: {}", evaluation.accuracy);

    let records = reconcile::reconcile(&classifier, &corpus);
    let indexed = index.close().await.context("Failed to close index")?;
    reconcile::write_report(&settings.report_path, &records)?;

    Ok(RunSummary {
        indexed,
        corpus: corpus.len(),
        evaluation,
        records,
    })
}
