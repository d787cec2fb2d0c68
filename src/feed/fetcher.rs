use std::time::Duration;

use feed_rs::model;
use feed_rs::parser;
use reqwest::Client;
use url::Url;

use crate::error::Result;
use crate::feed::dates;
use crate::models::Post;

/// The result of fetching one source: the newsletter's display name plus
/// its post candidates, already filtered of entries missing title or link.
pub struct FetchedFeed {
    pub source: String,
    pub posts: Vec<Post>,
}

pub struct FeedFetcher {
    client: Client,
    max_posts_per_feed: usize,
}

impl FeedFetcher {
    pub fn new(max_posts_per_feed: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("newsletter-tracker/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_posts_per_feed,
        }
    }

    /// Fetch and parse one newsletter feed. Any failure here is scoped to
    /// this source; the caller logs it and moves on.
    pub async fn fetch(&self, source_url: &str) -> Result<FetchedFeed> {
        let endpoint = feed_endpoint(source_url, self.max_posts_per_feed);
        tracing::info!("Fetching {}", endpoint);

        let response = self.client.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(
                anyhow::anyhow!("Failed to fetch {}: HTTP {}", endpoint, response.status()).into(),
            );
        }

        let bytes = response.bytes().await?;
        let feed = parser::parse(&bytes[..])?;

        Ok(collect_posts(feed, source_url, self.max_posts_per_feed))
    }
}

/// Derive the feed endpoint for a newsletter base URL. URLs already
/// pointing at a feed pass through; anything else gets the Substack-style
/// `/feed` path with a page-size query appended at the origin.
pub fn feed_endpoint(source_url: &str, limit: usize) -> String {
    let trimmed = source_url.trim_end_matches('/');
    if trimmed.ends_with(".rss") || trimmed.ends_with("/feed") {
        return trimmed.to_string();
    }
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_path("/feed");
            url.set_query(Some(&format!("limit={}", limit)));
            url.to_string()
        }
        Err(_) => format!("{}/feed?limit={}", trimmed, limit),
    }
}

fn collect_posts(feed: model::Feed, source_url: &str, cap: usize) -> FetchedFeed {
    let source = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| source_url.to_string());
    let feed_author = feed
        .authors
        .first()
        .map(|a| a.name.clone())
        .filter(|name| !name.is_empty());

    let posts = feed
        .entries
        .into_iter()
        .take(cap)
        .filter_map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let url = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();

            if title.is_empty() || url.is_empty() {
                return None;
            }

            let author = entry
                .authors
                .first()
                .map(|a| a.name.clone())
                .filter(|name| !name.is_empty())
                .or_else(|| feed_author.clone())
                .unwrap_or_else(|| source.clone());

            let summary = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_default();

            let tags = entry
                .categories
                .iter()
                .map(|c| c.term.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            let image_url = entry
                .media
                .first()
                .and_then(|m| m.content.first())
                .and_then(|c| c.url.as_ref())
                .map(|u| u.to_string())
                .unwrap_or_default();

            Some(Post {
                source: source.clone(),
                title,
                url,
                author,
                published: dates::normalize_entry_date(&entry),
                word_count: summary.split_whitespace().count() as i64,
                summary,
                tags,
                image_url,
            })
        })
        .collect();

    FetchedFeed { source, posts }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>Tech Weekly</title>
  <link>https://techweekly.example.com</link>
  <item>
    <title>  Hello World  </title>
    <link>http://a.com/1</link>
    <dc:creator>Jane Doe</dc:creator>
    <pubDate>Mon, 01 Jan 2024 12:00:00 GMT</pubDate>
    <description>First post summary text</description>
    <category>rust</category>
    <category>news</category>
    <media:content url="http://a.com/img.png" medium="image"/>
  </item>
  <item>
    <link>http://a.com/2</link>
    <description>This entry has no title and is dropped</description>
  </item>
  <item>
    <title>Second Post</title>
    <link>http://a.com/3</link>
  </item>
</channel>
</rss>"#;

    fn parse_sample() -> model::Feed {
        parser::parse(SAMPLE_RSS.as_bytes()).unwrap()
    }

    #[test]
    fn entries_are_normalized() {
        let fetched = collect_posts(parse_sample(), "https://techweekly.example.com", 60);
        assert_eq!(fetched.source, "Tech Weekly");
        assert_eq!(fetched.posts.len(), 2);

        let post = &fetched.posts[0];
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.url, "http://a.com/1");
        assert_eq!(post.author, "Jane Doe");
        assert_eq!(post.published, "2024-01-01 12:00:00");
        assert_eq!(post.summary, "First post summary text");
        assert_eq!(post.tags, "rust, news");
        assert_eq!(post.word_count, 4);
        assert_eq!(post.image_url, "http://a.com/img.png");
    }

    #[test]
    fn entry_without_title_is_dropped() {
        let fetched = collect_posts(parse_sample(), "https://techweekly.example.com", 60);
        assert!(fetched.posts.iter().all(|p| p.url != "http://a.com/2"));
    }

    #[test]
    fn author_falls_back_to_source_name() {
        let fetched = collect_posts(parse_sample(), "https://techweekly.example.com", 60);
        let post = &fetched.posts[1];
        assert_eq!(post.author, "Tech Weekly");
        assert_eq!(post.published, "");
        assert_eq!(post.word_count, 0);
    }

    #[test]
    fn entry_cap_is_applied() {
        let fetched = collect_posts(parse_sample(), "https://techweekly.example.com", 1);
        assert_eq!(fetched.posts.len(), 1);
    }

    #[test]
    fn feed_endpoint_appends_feed_path_at_origin() {
        assert_eq!(
            feed_endpoint("https://letters.example.com/", 60),
            "https://letters.example.com/feed?limit=60"
        );
        assert_eq!(
            feed_endpoint("https://letters.example.com/some/page", 25),
            "https://letters.example.com/feed?limit=25"
        );
    }

    #[test]
    fn feed_endpoint_passes_feed_urls_through() {
        assert_eq!(
            feed_endpoint("https://letters.example.com/feed", 60),
            "https://letters.example.com/feed"
        );
        assert_eq!(
            feed_endpoint("https://letters.example.com/posts.rss", 60),
            "https://letters.example.com/posts.rss"
        );
    }
}
