use std::path::Path;

use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::db::Repository;
use crate::dedup::is_similar_title;
use crate::error::{AppError, Result};
use crate::feed::FeedFetcher;
use crate::models::Post;

/// Drives the whole run: reads the source list, fans each source out over
/// a bounded pool of concurrent fetches, and aggregates insert counts.
/// Per-source failures are logged and absorbed; only storage errors and a
/// missing source list propagate.
pub struct Pipeline {
    repository: Repository,
    fetcher: FeedFetcher,
    config: Config,
}

impl Pipeline {
    pub fn new(repository: Repository, fetcher: FeedFetcher, config: Config) -> Self {
        Self {
            repository,
            fetcher,
            config,
        }
    }

    pub async fn run(&self) -> Result<usize> {
        let urls = read_source_list(&self.config.feed_list)?;
        tracing::info!("Processing {} sources", urls.len());

        let counts: Vec<usize> = stream::iter(urls)
            .map(|url| async move {
                match self.process_source(&url).await {
                    Ok(inserted) => inserted,
                    Err(e) => {
                        tracing::error!("Failed to process {}: {}", url, e);
                        0
                    }
                }
            })
            .buffer_unordered(self.config.max_workers.max(1))
            .collect()
            .await;

        let total = counts.into_iter().sum();
        tracing::info!("Run complete: {} new posts", total);
        Ok(total)
    }

    /// One source, end to end: fetch, filter near-duplicate titles against
    /// current store state, insert survivors in batches. The unique-URL
    /// constraint in the store remains the last line of defense if two
    /// runs race past the title check.
    async fn process_source(&self, url: &str) -> Result<usize> {
        let fetched = self.fetcher.fetch(url).await?;
        let candidates = fetched.posts.len();
        let existing = self.repository.titles_for_source(&fetched.source).await?;

        let mut inserted = 0;
        let mut batch: Vec<Post> = Vec::new();
        for post in fetched.posts {
            if is_similar_title(&post.title, &existing, self.config.similarity_threshold) {
                continue;
            }
            batch.push(post);
            if batch.len() >= self.config.batch_size {
                inserted += self.repository.insert_posts(std::mem::take(&mut batch)).await?;
            }
        }
        inserted += self.repository.insert_posts(batch).await?;

        tracing::info!(
            "Inserted {}/{} posts from {}",
            inserted,
            candidates,
            fetched.source
        );
        Ok(inserted)
    }
}

/// Read the newline-delimited source list; blank lines are skipped. A
/// missing file is the one startup error that fails the whole run.
pub fn read_source_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(AppError::MissingSourceList(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
