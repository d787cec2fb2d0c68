pub const SCHEMA: &str = r#"
-- posts table (append-only from the pipeline's perspective)
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT,
    title TEXT,
    url TEXT UNIQUE,
    author TEXT,
    published TEXT,
    summary TEXT,
    tags TEXT,
    word_count INTEGER,
    image_url TEXT,
    fetched_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_posts_url ON posts(url);
CREATE INDEX IF NOT EXISTS idx_posts_source ON posts(source);
"#;
