use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Newline-delimited list of newsletter base URLs, read once per run.
    #[serde(default = "default_feed_list")]
    pub feed_list: PathBuf,

    /// Bound on concurrent feed fetches.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Titles above this similarity ratio are treated as near-duplicates.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_max_posts_per_feed")]
    pub max_posts_per_feed: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsletter-tracker");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("posts.db").to_string_lossy().to_string()
}

fn default_feed_list() -> PathBuf {
    PathBuf::from("newsletters.txt")
}

fn default_max_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    50
}

fn default_similarity_threshold() -> f64 {
    0.9
}

fn default_max_posts_per_feed() -> usize {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            feed_list: default_feed_list(),
            max_workers: default_max_workers(),
            batch_size: default_batch_size(),
            similarity_threshold: default_similarity_threshold(),
            max_posts_per_feed: default_max_posts_per_feed(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsletter-tracker")
            .join("config.toml")
    }
}
