use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Article, KeyWords};
use crate::Result;

/// A keyword row as written during a rebuild, before its articles are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRow {
    pub id: String,
    pub keyword: String,
    pub last_update: DateTime<Utc>,
}

/// One keyword-to-article association row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeywordAssociation {
    pub keyword_id: String,
    pub article_id: String,
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Every persisted article, with its outgoing links.
    async fn load_all(&self) -> Result<Vec<Article>>;

    /// Articles published at or after `cutoff`.
    async fn load_published_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Article>>;

    /// Inserts articles whose id is not yet present. Existing rows are left
    /// untouched. Returns the number of rows inserted.
    async fn upsert_articles(&self, articles: &[Article]) -> Result<usize>;

    /// Adds similarity edges from `article_id`. Already present edges are ignored.
    async fn append_links(&self, article_id: &str, targets: &[String]) -> Result<()>;

    /// Removes articles published before `cutoff` together with their link and
    /// keyword association rows. Returns the number of articles removed.
    async fn delete_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Persisted keywords with their article ids, ordered by keyword.
    async fn load_keywords(&self) -> Result<Vec<KeyWords>>;

    /// Opens the atomic scope used to rebuild keywords. Nothing written through
    /// the returned transaction is visible until it is committed.
    async fn begin_keywords(&self) -> Result<Box<dyn KeywordTransaction>>;
}

#[async_trait]
pub trait KeywordTransaction: Send {
    async fn delete_all_associations(&mut self) -> Result<u64>;

    async fn delete_all_keywords(&mut self) -> Result<u64>;

    async fn insert_keywords(&mut self, rows: &[KeywordRow]) -> Result<()>;

    /// Persisted keyword ids by canonical keyword string.
    async fn resolve_keyword_ids(&mut self, keywords: &[String]) -> Result<HashMap<String, String>>;

    async fn insert_associations(&mut self, rows: &[KeywordAssociation]) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
