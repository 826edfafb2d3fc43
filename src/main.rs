mod classify;
mod crawler;
mod document;
mod index;
mod parser;
mod pipeline;
mod reconcile;
mod settings;

use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::settings::Settings;
use crate::index::elastic::ElasticClient;
use crate::index::{Query, SearchBackend};

#[derive(Parser)]
#[command(
    name = "course_classifier",
    about = "Crawl course listings, index them and predict their categories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the index, crawl every category, train and write the report
    Run,
    /// Query the index (title weighted over description by default)
    Search {
        /// Free text matched against title^2 and description
        text: Option<String>,
        /// Full-text match on the category field instead
        #[arg(short, long, conflicts_with_all = ["text", "url"])]
        category: Option<String>,
        /// Exact match on the listing URL instead
        #[arg(short, long, conflicts_with = "text")]
        url: Option<String>,
        /// Max hits to display
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Show how many documents the index holds
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run => {
            let backend = ElasticClient::new(&settings.elastic_url)?;
            let http = crawler::http_client(&settings.user_agent)?;
            let summary = pipeline::run(&settings, &http, backend).await?;
            println!(
                "Indexed {} listings, trained on {}, reconciled {} ({} correct). Report: {}",
                summary.indexed,
                summary.evaluation.train_size,
                summary.corpus,
                summary.correct(),
                settings.report_path.display()
            );
            Ok(())
        }
        Commands::Search {
            text,
            category,
            url,
            limit,
        } => {
            let query = match (text, category, url) {
                (_, Some(category), _) => Query::Match {
                    field: "category".into(),
                    query: category,
                },
                (_, _, Some(url)) => Query::Term {
                    field: "url".into(),
                    value: url,
                },
                (Some(text), _, _) => Query::listing_text(&text),
                (None, None, None) => Query::MatchAll,
            };
            let backend = ElasticClient::new(&settings.elastic_url)?;
            let hits = backend
                .search(&settings.index_name, &query, limit)
                .await
                .context("Search failed")?;
            if hits.is_empty() {
                println!("No listings found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:>6} | {:<40} | {:<20} | URL",
                "#", "Score", "Title", "Category"
            );
            println!("{}", "-".repeat(100));
            for (i, hit) in hits.iter().enumerate() {
                let score = hit
                    .score
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{:>3} | {:>6} | {:<40} | {:<20} | {}",
                    i + 1,
                    score,
                    truncate(&hit.source.title, 40),
                    truncate(&hit.source.category, 20),
                    hit.source.url
                );
            }
            Ok(())
        }
        Commands::Stats => {
            let backend = ElasticClient::new(&settings.elastic_url)?;
            let count = backend.count(&settings.index_name).await?;
            println!("Index:     {}", settings.index_name);
            println!("Documents: {}", count);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
