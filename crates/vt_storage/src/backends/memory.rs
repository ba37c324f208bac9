use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use vt_core::{
    Article, ArticleStorage, Error, KeyWords, KeywordAssociation, KeywordRow, KeywordTransaction,
    Result,
};

use crate::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: BTreeMap<String, Article>,
    keywords: BTreeMap<String, KeywordRow>,
    associations: BTreeSet<KeywordAssociation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert_articles(&mut self, articles: &[Article]) -> usize {
        let mut inserted = 0;
        for article in articles {
            if article.id.is_empty() || self.articles.contains_key(&article.id) {
                continue;
            }
            self.articles.insert(article.id.clone(), article.clone());
            inserted += 1;
        }
        inserted
    }

    fn append_links(&mut self, article_id: &str, targets: &[String]) -> Result<()> {
        let article = self
            .articles
            .get_mut(article_id)
            .ok_or_else(|| Error::storage(format!("unknown article {}", article_id)))?;
        for target in targets {
            article.link_to(target);
        }
        Ok(())
    }

    fn delete_published_before(&mut self, cutoff: DateTime<Utc>) -> u64 {
        let expired: BTreeSet<String> = self
            .articles
            .values()
            .filter(|a| a.published_at < cutoff)
            .map(|a| a.id.clone())
            .collect();

        self.articles.retain(|id, _| !expired.contains(id));
        for article in self.articles.values_mut() {
            article.linked_to.retain(|target| !expired.contains(target));
        }
        self.associations.retain(|a| !expired.contains(&a.article_id));
        expired.len() as u64
    }

    fn load_keywords(&self) -> Vec<KeyWords> {
        let mut articles_by_keyword: HashMap<&str, Vec<String>> = HashMap::new();
        for association in &self.associations {
            articles_by_keyword
                .entry(association.keyword_id.as_str())
                .or_default()
                .push(association.article_id.clone());
        }

        let mut keywords: Vec<KeyWords> = self
            .keywords
            .values()
            .map(|row| KeyWords {
                id: row.id.clone(),
                keyword: row.keyword.clone(),
                last_update: row.last_update,
                articles: articles_by_keyword.remove(row.id.as_str()).unwrap_or_default(),
            })
            .collect();
        keywords.sort_by(|a, b| a.keyword.cmp(&b.keyword));
        keywords
    }
}

/// Process-local storage. Used for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> {
        Ok(InMemoryStorage::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn load_all(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.values().cloned().collect())
    }

    async fn load_published_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        let mut articles: Vec<Article> = store
            .articles
            .values()
            .filter(|a| a.published_at >= cutoff)
            .cloned()
            .collect();
        articles.sort_by(|a, b| a.published_at.cmp(&b.published_at).then_with(|| a.id.cmp(&b.id)));
        Ok(articles)
    }

    async fn upsert_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut store = self.store.write().await;
        Ok(store.upsert_articles(articles))
    }

    async fn append_links(&self, article_id: &str, targets: &[String]) -> Result<()> {
        let mut store = self.store.write().await;
        store.append_links(article_id, targets)
    }

    async fn delete_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut store = self.store.write().await;
        Ok(store.delete_published_before(cutoff))
    }

    async fn load_keywords(&self) -> Result<Vec<KeyWords>> {
        let store = self.store.read().await;
        Ok(store.load_keywords())
    }

    async fn begin_keywords(&self) -> Result<Box<dyn KeywordTransaction>> {
        let guard = self.store.clone().write_owned().await;
        let keywords = guard.keywords.clone();
        let associations = guard.associations.clone();
        Ok(Box::new(MemoryKeywordTransaction {
            guard,
            keywords,
            associations,
        }))
    }
}

/// Holds the store's write lock for its whole lifetime and stages keyword
/// changes until commit.
pub struct MemoryKeywordTransaction {
    guard: OwnedRwLockWriteGuard<MemoryStore>,
    keywords: BTreeMap<String, KeywordRow>,
    associations: BTreeSet<KeywordAssociation>,
}

#[async_trait]
impl KeywordTransaction for MemoryKeywordTransaction {
    async fn delete_all_associations(&mut self) -> Result<u64> {
        let removed = self.associations.len() as u64;
        self.associations.clear();
        Ok(removed)
    }

    async fn delete_all_keywords(&mut self) -> Result<u64> {
        if !self.associations.is_empty() {
            return Err(Error::storage("keywords still referenced by associations"));
        }
        let removed = self.keywords.len() as u64;
        self.keywords.clear();
        Ok(removed)
    }

    async fn insert_keywords(&mut self, rows: &[KeywordRow]) -> Result<()> {
        for row in rows {
            if self.keywords.contains_key(&row.id) {
                return Err(Error::storage(format!("duplicate keyword id {}", row.id)));
            }
            if self.keywords.values().any(|k| k.keyword == row.keyword) {
                return Err(Error::storage(format!("duplicate keyword {:?}", row.keyword)));
            }
            self.keywords.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }

    async fn resolve_keyword_ids(&mut self, keywords: &[String]) -> Result<HashMap<String, String>> {
        Ok(self
            .keywords
            .values()
            .filter(|row| keywords.contains(&row.keyword))
            .map(|row| (row.keyword.clone(), row.id.clone()))
            .collect())
    }

    async fn insert_associations(&mut self, rows: &[KeywordAssociation]) -> Result<()> {
        for row in rows {
            if !self.keywords.contains_key(&row.keyword_id) {
                return Err(Error::storage(format!("unknown keyword {}", row.keyword_id)));
            }
            if !self.guard.articles.contains_key(&row.article_id) {
                return Err(Error::storage(format!("unknown article {}", row.article_id)));
            }
            self.associations.insert(row.clone());
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryKeywordTransaction {
            mut guard,
            keywords,
            associations,
        } = *self;
        guard.keywords = keywords;
        guard.associations = associations;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
