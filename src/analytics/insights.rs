//! Engagement insights computed from stored posts.
//!
//! All functions are pure over a post slice with an injected `now`, so
//! window boundaries are deterministic under test. Posts whose
//! `published` field failed to normalize (empty string) are ignored.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::feed::dates::parse_date_str;
use crate::models::StoredPost;

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct HotAuthor {
    pub author: String,
    pub count: usize,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColdSource {
    pub source: String,
    pub days_since: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVoice {
    pub author: String,
    pub days_ago: i64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RisingStar {
    pub author: String,
    pub increase_pct: f64,
    pub recent_count: usize,
}

/// Pull an email address out of a `Name <addr@host>` author string.
pub fn extract_email(author: &str) -> Option<String> {
    let re = Regex::new(r"<([^>]+@[^>]+)>").ok()?;
    re.captures(author)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

fn published_dates(posts: &[StoredPost]) -> Vec<(&StoredPost, DateTime<Utc>)> {
    posts
        .iter()
        .filter_map(|post| parse_date_str(&post.published).map(|dt| (post, dt)))
        .collect()
}

/// Authors with 3+ posts in the last 30 days, top 5 by post count.
pub fn hot_authors(posts: &[StoredPost], now: DateTime<Utc>) -> Vec<HotAuthor> {
    let cutoff = now - Duration::days(30);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (post, published) in published_dates(posts) {
        if published >= cutoff {
            *counts.entry(post.author.as_str()).or_default() += 1;
        }
    }

    let mut hot: Vec<HotAuthor> = counts
        .into_iter()
        .filter(|(_, count)| *count >= 3)
        .map(|(author, count)| HotAuthor {
            email: extract_email(author),
            author: author.to_string(),
            count,
        })
        .collect();
    hot.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.author.cmp(&b.author)));
    hot.truncate(TOP_N);
    hot
}

/// Newsletters whose latest post is 14+ days old, top 5 by staleness.
pub fn going_cold(posts: &[StoredPost], now: DateTime<Utc>) -> Vec<ColdSource> {
    let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for (post, published) in published_dates(posts) {
        let entry = latest.entry(post.source.as_str()).or_insert(published);
        if published > *entry {
            *entry = published;
        }
    }

    let mut cold: Vec<ColdSource> = latest
        .into_iter()
        .map(|(source, last_post)| ColdSource {
            source: source.to_string(),
            days_since: (now - last_post).num_days(),
        })
        .filter(|c| c.days_since >= 14)
        .collect();
    cold.sort_by(|a, b| {
        b.days_since
            .cmp(&a.days_since)
            .then_with(|| a.source.cmp(&b.source))
    });
    cold.truncate(TOP_N);
    cold
}

/// Authors whose first post landed within the last 60 days, top 5 most
/// recent arrivals first.
pub fn new_voices(posts: &[StoredPost], now: DateTime<Utc>) -> Vec<NewVoice> {
    let mut first: HashMap<&str, (DateTime<Utc>, &str)> = HashMap::new();
    for (post, published) in published_dates(posts) {
        let entry = first
            .entry(post.author.as_str())
            .or_insert((published, post.source.as_str()));
        if published < entry.0 {
            *entry = (published, post.source.as_str());
        }
    }

    let mut voices: Vec<NewVoice> = first
        .into_iter()
        .map(|(author, (first_post, source))| NewVoice {
            author: author.to_string(),
            days_ago: (now - first_post).num_days(),
            source: source.to_string(),
        })
        .filter(|v| v.days_ago <= 60)
        .collect();
    voices.sort_by(|a, b| a.days_ago.cmp(&b.days_ago).then_with(|| a.author.cmp(&b.author)));
    voices.truncate(TOP_N);
    voices
}

/// Authors posting 50%+ more in the last 30 days than in the 30 days
/// before that, top 5 by increase.
pub fn rising_stars(posts: &[StoredPost], now: DateTime<Utc>) -> Vec<RisingStar> {
    let cutoff_30 = now - Duration::days(30);
    let cutoff_60 = now - Duration::days(60);

    let mut windows: HashMap<&str, (usize, usize)> = HashMap::new();
    for (post, published) in published_dates(posts) {
        let entry = windows.entry(post.author.as_str()).or_default();
        if published >= cutoff_30 {
            entry.0 += 1;
        } else if published >= cutoff_60 {
            entry.1 += 1;
        }
    }

    let mut stars: Vec<RisingStar> = windows
        .into_iter()
        .filter(|(_, (_, prev))| *prev > 0)
        .map(|(author, (recent, prev))| RisingStar {
            author: author.to_string(),
            increase_pct: (recent as f64 - prev as f64) / prev as f64 * 100.0,
            recent_count: recent,
        })
        .filter(|s| s.increase_pct >= 50.0)
        .collect();
    stars.sort_by(|a, b| {
        b.increase_pct
            .partial_cmp(&a.increase_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.author.cmp(&b.author))
    });
    stars.truncate(TOP_N);
    stars
}

/// Plain-text engagement report for the CLI.
pub fn render_report(posts: &[StoredPost], now: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("Hot authors (3+ posts in the last 30 days)\n");
    let hot = hot_authors(posts, now);
    if hot.is_empty() {
        out.push_str("  (none)\n");
    }
    for h in &hot {
        match &h.email {
            Some(email) => {
                out.push_str(&format!("  {} - {} posts ({})\n", h.author, h.count, email))
            }
            None => out.push_str(&format!("  {} - {} posts\n", h.author, h.count)),
        }
    }

    out.push_str("\nRising stars (50%+ more posts than the prior 30 days)\n");
    let stars = rising_stars(posts, now);
    if stars.is_empty() {
        out.push_str("  (none)\n");
    }
    for s in &stars {
        out.push_str(&format!(
            "  {} - up {:.0}%, {} recent posts\n",
            s.author, s.increase_pct, s.recent_count
        ));
    }

    out.push_str("\nNew voices (first post within 60 days)\n");
    let voices = new_voices(posts, now);
    if voices.is_empty() {
        out.push_str("  (none)\n");
    }
    for v in &voices {
        out.push_str(&format!(
            "  {} - {} days ago via {}\n",
            v.author, v.days_ago, v.source
        ));
    }

    out.push_str("\nGoing cold (no post for 14+ days)\n");
    let cold = going_cold(posts, now);
    if cold.is_empty() {
        out.push_str("  (none)\n");
    }
    for c in &cold {
        out.push_str(&format!("  {} - {} days quiet\n", c.source, c.days_since));
    }

    out
}
