use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, Transaction};
use tracing::debug;
use vt_core::{
    Article, ArticleStorage, Error, KeyWords, KeywordAssociation, KeywordRow, KeywordTransaction,
    Language, Result, Source,
};

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        uri TEXT NOT NULL,
        source TEXT NOT NULL,
        published_at TEXT NOT NULL,
        banner TEXT,
        category TEXT NOT NULL DEFAULT '[]',
        language TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS article_links (
        article_id TEXT NOT NULL REFERENCES articles (id),
        linked_id TEXT NOT NULL REFERENCES articles (id),
        PRIMARY KEY (article_id, linked_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS key_words (
        id TEXT PRIMARY KEY,
        keyword TEXT NOT NULL UNIQUE,
        last_update TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS article_keywords (
        key_words_id TEXT NOT NULL REFERENCES key_words (id),
        article_id TEXT NOT NULL REFERENCES articles (id),
        PRIMARY KEY (key_words_id, article_id)
    )
    "#,
];

/// Rows per multi-value statement, below SQLite's bound parameter limit.
const INSERT_CHUNK: usize = 100;

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::storage(format!("{}: {}", context, e))
}

/// Fixed-width UTC timestamps so string comparison follows time order.
fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("Failed to parse date {:?}: {}", value, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let read = db_error("Failed to read article row");
    let source: String = row.try_get("source").map_err(&read)?;
    let language: String = row.try_get("language").map_err(&read)?;
    let published_at: String = row.try_get("published_at").map_err(&read)?;
    let category: String = row.try_get("category").map_err(&read)?;

    Ok(Article {
        id: row.try_get("id").map_err(&read)?,
        title: row.try_get("title").map_err(&read)?,
        description: row.try_get("description").map_err(&read)?,
        uri: row.try_get("uri").map_err(&read)?,
        source: Source::from_str(&source)?,
        published_at: decode_time(&published_at)?,
        banner: row.try_get("banner").map_err(&read)?,
        category: serde_json::from_str(&category)?,
        language: Language::from_str(&language)?,
        linked_to: Vec::new(),
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./veritas.db"
    }

    async fn new() -> Result<Self> {
        Self::new_with_path(Path::new("veritas.db")).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn attach_links(&self, articles: &mut [Article]) -> Result<()> {
        let rows = sqlx::query("SELECT article_id, linked_id FROM article_links ORDER BY rowid")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to load article links"))?;

        let mut links: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let article_id: String = row.get("article_id");
            let linked_id: String = row.get("linked_id");
            links.entry(article_id).or_default().push(linked_id);
        }

        for article in articles {
            if let Some(targets) = links.remove(&article.id) {
                article.linked_to = targets;
            }
        }
        Ok(())
    }

    async fn select_articles(&self, cutoff: Option<DateTime<Utc>>) -> Result<Vec<Article>> {
        let rows = match cutoff {
            Some(cutoff) => {
                sqlx::query("SELECT * FROM articles WHERE published_at >= ? ORDER BY published_at, id")
                    .bind(encode_time(cutoff))
                    .fetch_all(&*self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM articles ORDER BY id")
                    .fetch_all(&*self.pool)
                    .await
            }
        }
        .map_err(db_error("Failed to load articles"))?;

        let mut articles = rows.iter().map(row_to_article).collect::<Result<Vec<_>>>()?;
        self.attach_links(&mut articles).await?;
        Ok(articles)
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn load_all(&self) -> Result<Vec<Article>> {
        self.select_articles(None).await
    }

    async fn load_published_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Article>> {
        self.select_articles(Some(cutoff)).await
    }

    async fn upsert_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let mut inserted = Vec::new();

        for article in articles.iter().filter(|a| !a.id.is_empty()) {
            let category = serde_json::to_string(&article.category)?;
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO articles
                (id, title, description, uri, source, published_at, banner, category, language)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.uri)
            .bind(article.source.slug())
            .bind(encode_time(article.published_at))
            .bind(article.banner.as_deref())
            .bind(category)
            .bind(article.language.code())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store article"))?;

            if result.rows_affected() > 0 {
                inserted.push(article);
            }
        }

        // Links go in after every row of the batch exists.
        for article in &inserted {
            for target in article.linked_to.iter().filter(|t| !t.is_empty()) {
                sqlx::query("INSERT OR IGNORE INTO article_links (article_id, linked_id) VALUES (?, ?)")
                    .bind(&article.id)
                    .bind(target)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("Failed to store article link"))?;
            }
        }

        tx.commit().await.map_err(db_error("Failed to commit articles"))?;
        debug!(inserted = inserted.len(), total = articles.len(), "articles upserted");
        Ok(inserted.len())
    }

    async fn append_links(&self, article_id: &str, targets: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        for target in targets.iter().filter(|t| !t.is_empty() && t.as_str() != article_id) {
            sqlx::query("INSERT OR IGNORE INTO article_links (article_id, linked_id) VALUES (?, ?)")
                .bind(article_id)
                .bind(target)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to store article link"))?;
        }
        tx.commit().await.map_err(db_error("Failed to commit article links"))
    }

    async fn delete_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let cutoff = encode_time(cutoff);
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let expired = "SELECT id FROM articles WHERE published_at < ?";
        sqlx::query(&format!(
            "DELETE FROM article_links WHERE article_id IN ({0}) OR linked_id IN ({0})",
            expired
        ))
        .bind(&cutoff)
        .bind(&cutoff)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to delete article links"))?;

        sqlx::query(&format!("DELETE FROM article_keywords WHERE article_id IN ({})", expired))
            .bind(&cutoff)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete keyword associations"))?;

        let result = sqlx::query("DELETE FROM articles WHERE published_at < ?")
            .bind(&cutoff)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete articles"))?;

        tx.commit().await.map_err(db_error("Failed to commit cleanup"))?;
        Ok(result.rows_affected())
    }

    async fn load_keywords(&self) -> Result<Vec<KeyWords>> {
        let rows = sqlx::query("SELECT id, keyword, last_update FROM key_words ORDER BY keyword")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to load keywords"))?;
        let links = sqlx::query(
            "SELECT key_words_id, article_id FROM article_keywords ORDER BY key_words_id, article_id",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to load keyword associations"))?;

        let mut articles: HashMap<String, Vec<String>> = HashMap::new();
        for link in links {
            let keyword_id: String = link.get("key_words_id");
            articles.entry(keyword_id).or_default().push(link.get("article_id"));
        }

        let mut keywords = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let last_update: String = row.get("last_update");
            keywords.push(KeyWords {
                articles: articles.remove(&id).unwrap_or_default(),
                keyword: row.get("keyword"),
                last_update: decode_time(&last_update)?,
                id,
            });
        }
        Ok(keywords)
    }

    async fn begin_keywords(&self) -> Result<Box<dyn KeywordTransaction>> {
        let tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        Ok(Box::new(SqliteKeywordTransaction { tx }))
    }
}

pub struct SqliteKeywordTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl KeywordTransaction for SqliteKeywordTransaction {
    async fn delete_all_associations(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM article_keywords")
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete keyword associations"))?;
        Ok(result.rows_affected())
    }

    async fn delete_all_keywords(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM key_words")
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete keywords"))?;
        Ok(result.rows_affected())
    }

    async fn insert_keywords(&mut self, rows: &[KeywordRow]) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO key_words (id, keyword, last_update) ");
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.id.clone())
                    .push_bind(row.keyword.clone())
                    .push_bind(encode_time(row.last_update));
            });
            builder
                .build()
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to insert keywords"))?;
        }
        Ok(())
    }

    async fn resolve_keyword_ids(&mut self, keywords: &[String]) -> Result<HashMap<String, String>> {
        let mut ids = HashMap::with_capacity(keywords.len());
        for chunk in keywords.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT id, keyword FROM key_words WHERE keyword IN (");
            let mut separated = builder.separated(", ");
            for keyword in chunk {
                separated.push_bind(keyword.clone());
            }
            separated.push_unseparated(")");

            let rows = builder
                .build()
                .fetch_all(&mut *self.tx)
                .await
                .map_err(db_error("Failed to resolve keyword ids"))?;
            for row in rows {
                ids.insert(row.get("keyword"), row.get("id"));
            }
        }
        Ok(ids)
    }

    async fn insert_associations(&mut self, rows: &[KeywordAssociation]) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO article_keywords (key_words_id, article_id) ");
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.keyword_id.clone()).push_bind(row.article_id.clone());
            });
            builder
                .build()
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to insert keyword associations"))?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(db_error("Failed to commit keywords"))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(db_error("Failed to roll back keywords"))
    }
}
