use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::classify::SplitConfig;

const ENV_PREFIX: &str = "COURSES";

const CATEGORY_URLS: [&str; 5] = [
    "https://blog.faradars.org/category/programming/",
    "https://blog.faradars.org/category/english-language/",
    "https://blog.faradars.org/category/mathematics/",
    "https://blog.faradars.org/category/biology/",
    "https://blog.faradars.org/category/health/",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub elastic_url: String,
    pub index_name: String,
    pub category_urls: Vec<String>,
    pub page_size: usize,
    pub corpus_cap: usize,
    pub scroll_keep_alive: String,
    pub split_seed: u64,
    pub test_ratio: f64,
    pub report_path: PathBuf,
    pub user_agent: String,
}

impl Settings {
    /// Built-in defaults, overridable through `COURSES_*` environment variables.
    pub fn load() -> Result<Self> {
        let source = Config::builder()
            .set_default("elastic_url", "http://localhost:9200")?
            .set_default("index_name", "courses")?
            .set_default("category_urls", CATEGORY_URLS.to_vec())?
            .set_default("page_size", 100_i64)?
            .set_default("corpus_cap", 100_i64)?
            .set_default("scroll_keep_alive", "2m")?
            .set_default("split_seed", 42_i64)?
            .set_default("test_ratio", 0.2)?
            .set_default("report_path", "predicted_categories.txt")?
            .set_default("user_agent", concat!("course_classifier/", env!("CARGO_PKG_VERSION")))?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("category_urls"),
            )
            .build()
            .context("Failed to load settings")?;

        let settings: Settings = source
            .try_deserialize()
            .context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be positive");
        }
        if self.corpus_cap == 0 {
            bail!("corpus_cap must be positive");
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            bail!("test_ratio must be between 0 and 1, got {}", self.test_ratio);
        }
        Ok(())
    }

    pub fn split(&self) -> SplitConfig {
        SplitConfig {
            test_ratio: self.test_ratio,
            seed: self.split_seed,
        }
    }
}
