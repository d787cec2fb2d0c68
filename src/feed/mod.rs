pub mod dates;
mod fetcher;

pub use fetcher::FeedFetcher;
