use chrono::Utc;
use rusqlite::params;
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Post, StoredPost};

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Insert a batch of posts in one transaction. Posts whose `url`
    /// collides with an existing row are silently skipped. Returns the
    /// number of rows actually inserted.
    pub async fn insert_posts(&self, posts: Vec<Post>) -> Result<usize> {
        if posts.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0usize;
                {
                    let mut stmt = tx.prepare_cached(
                        r#"INSERT OR IGNORE INTO posts (
                               source, title, url, author, published,
                               summary, tags, word_count, image_url, fetched_at
                           )
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                    )?;
                    for post in posts {
                        inserted += stmt.execute(params![
                            post.source,
                            post.title,
                            post.url,
                            post.author,
                            post.published,
                            post.summary,
                            post.tags,
                            post.word_count,
                            post.image_url,
                            Utc::now().to_rfc3339(),
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;
        Ok(inserted)
    }

    /// All titles stored under a source name, used as dedup input.
    /// No ordering guarantee.
    pub async fn titles_for_source(&self, source: &str) -> Result<Vec<String>> {
        let source = source.to_string();
        let titles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT title FROM posts WHERE source = ?1")?;
                let titles = stmt
                    .query_map(params![source], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(titles)
            })
            .await?;
        Ok(titles)
    }

    pub async fn all_posts(&self) -> Result<Vec<StoredPost>> {
        let posts = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT source, title, author, published FROM posts")?;
                let posts = stmt
                    .query_map([], |row| {
                        Ok(StoredPost {
                            source: row.get(0)?,
                            title: row.get(1)?,
                            author: row.get(2)?,
                            published: row.get(3)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(posts)
            })
            .await?;
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_repo(dir: &tempfile::TempDir) -> Repository {
        let db_path = dir.path().join("posts.db");
        Repository::new(db_path.to_str().unwrap()).await.unwrap()
    }

    fn sample_post(title: &str, url: &str) -> Post {
        Post {
            source: "Tech Weekly".to_string(),
            title: title.to_string(),
            url: url.to_string(),
            author: "Jane Doe <jane@example.com>".to_string(),
            published: "2024-01-01 12:00:00".to_string(),
            summary: "A short excerpt".to_string(),
            tags: "rust, news".to_string(),
            word_count: 3,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("posts.db");
        Repository::new(db_path.to_str().unwrap()).await.unwrap();
        // Opening again must not fail or clobber existing rows.
        let repo = Repository::new(db_path.to_str().unwrap()).await.unwrap();
        let inserted = repo
            .insert_posts(vec![sample_post("Hello", "http://a.com/1")])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        Repository::new(db_path.to_str().unwrap()).await.unwrap();
        let repo = Repository::new(db_path.to_str().unwrap()).await.unwrap();
        assert_eq!(repo.all_posts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_batch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = open_repo(&dir).await;

        let batch = vec![
            sample_post("First", "http://a.com/1"),
            sample_post("Second", "http://a.com/2"),
            sample_post("Third", "http://a.com/3"),
        ];
        assert_eq!(repo.insert_posts(batch.clone()).await.unwrap(), 3);
        assert_eq!(repo.all_posts().await.unwrap().len(), 3);

        // Re-running the same batch inserts nothing.
        assert_eq!(repo.insert_posts(batch).await.unwrap(), 0);
        assert_eq!(repo.all_posts().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_url_is_silently_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = open_repo(&dir).await;

        assert_eq!(
            repo.insert_posts(vec![sample_post("Hello", "http://a.com/1")])
                .await
                .unwrap(),
            1
        );
        // Same URL under a different title still collides.
        assert_eq!(
            repo.insert_posts(vec![sample_post("Hello, again", "http://a.com/1")])
                .await
                .unwrap(),
            0
        );
        let posts = repo.all_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Hello");
    }

    #[tokio::test]
    async fn empty_batch_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = open_repo(&dir).await;
        assert_eq!(repo.insert_posts(Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn titles_are_scoped_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let repo = open_repo(&dir).await;

        let mut other = sample_post("Other Post", "http://b.com/1");
        other.source = "Other Letter".to_string();
        repo.insert_posts(vec![sample_post("Hello", "http://a.com/1"), other])
            .await
            .unwrap();

        let titles = repo.titles_for_source("Tech Weekly").await.unwrap();
        assert_eq!(titles, vec!["Hello".to_string()]);
        assert!(repo.titles_for_source("Unknown").await.unwrap().is_empty());
    }
}
