/// A fully-typed post candidate produced at the fetcher boundary.
///
/// Candidates with an empty title or url never reach the store; the
/// fetcher drops them before handing entries downstream. `fetched_at` is
/// assigned by the repository at insert time, never carried here.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Newsletter display name from feed metadata, or the source URL.
    pub source: String,
    pub title: String,
    /// Canonical link; the sole hard-dedup key in the store.
    pub url: String,
    pub author: String,
    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp (UTC), or empty if
    /// no feed date field could be parsed.
    pub published: String,
    pub summary: String,
    /// Comma-joined category terms.
    pub tags: String,
    pub word_count: i64,
    pub image_url: String,
}

/// A stored row projected down to what the insights report reads.
#[derive(Debug, Clone)]
pub struct StoredPost {
    pub source: String,
    pub title: String,
    pub author: String,
    pub published: String,
}
