mod analytics;
mod config;
mod db;
mod dedup;
mod error;
mod feed;
mod models;
mod pipeline;

use config::Config;
use db::Repository;
use error::Result;
use feed::FeedFetcher;
use pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Per-source progress goes to stderr via tracing; INFO by default.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    let repository = Repository::new(&config.db_path).await?;

    // Check for --insights flag (report from stored posts, no fetching)
    if args.len() >= 2 && args[1] == "--insights" {
        let posts = repository.all_posts().await?;
        print!("{}", analytics::render_report(&posts, chrono::Utc::now()));
        return Ok(());
    }

    // Default: run the fetch pipeline. Per-feed failures are logged and
    // absorbed; a missing source list or storage error exits nonzero.
    let fetcher = FeedFetcher::new(config.max_posts_per_feed);
    let pipeline = Pipeline::new(repository, fetcher, config);
    let inserted = pipeline.run().await?;
    println!("Inserted {} new posts", inserted);

    Ok(())
}
