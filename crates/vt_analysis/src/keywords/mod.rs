//! Periodic keyword mining over the recent article window.
//!
//! One run loads the window, drops duplicate titles, clusters around seed
//! articles, scores n-gram candidates per cluster, merges them across
//! clusters, removes redundant keywords and rebuilds the keyword tables in a
//! single transaction.

pub mod extract;
pub mod merge;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vt_core::{
    days_before, Article, ArticleStorage, Error, KeywordAssociation, KeywordRow, KeywordTransaction,
    MetricsSink, NoopMetrics, Result,
};

use crate::config::KeywordConfig;
use crate::similarity::SimilarityScorer;
use crate::text::{Stopwords, TitleCaser};

pub use extract::{cluster_articles, dedup_by_title, extract_candidates, select_top, BOILERPLATE};
pub use merge::{canonicalize, dedup_by_coverage, eliminate_redundant, KeywordCandidate, KeywordMerger};

pub const JOB_NAME: &str = "keywords";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiningReport {
    pub loaded: usize,
    pub unique: usize,
    pub clusters: usize,
    pub keywords: usize,
    pub associations: usize,
}

pub struct KeywordMiner {
    storage: Arc<dyn ArticleStorage>,
    scorer: Arc<SimilarityScorer>,
    stopwords: Arc<Stopwords>,
    caser: TitleCaser,
    config: KeywordConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl KeywordMiner {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        scorer: Arc<SimilarityScorer>,
        stopwords: Arc<Stopwords>,
        config: KeywordConfig,
    ) -> Self {
        Self {
            storage,
            scorer,
            stopwords,
            caser: TitleCaser::default(),
            config,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_caser(mut self, caser: TitleCaser) -> Self {
        self.caser = caser;
        self
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    /// Mines the window ending at `now` and replaces all persisted keywords.
    /// On failure nothing is changed.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<MiningReport> {
        let started = Instant::now();
        self.metrics.job_run(JOB_NAME);

        let result = self.run_cycle(now).await;

        self.metrics.job_duration(JOB_NAME, started.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.job_error(JOB_NAME);
        }
        result
    }

    async fn run_cycle(&self, now: DateTime<Utc>) -> Result<MiningReport> {
        let cutoff = days_before(now, self.config.window_days)?;
        let articles = self.storage.load_published_since(cutoff).await?;
        if articles.is_empty() {
            info!("📭 No articles in the last {} days, keywords left as they are", self.config.window_days);
            return Ok(MiningReport::default());
        }

        let loaded = articles.len();
        let articles = dedup_by_title(articles);
        let unique = articles.len();
        let clusters = cluster_articles(&self.scorer, &articles, self.config.cluster_threshold);
        debug!(loaded, unique, clusters = clusters.len(), "articles clustered");

        let keywords = self.mine_clusters(&clusters);
        let associations = self.persist(&keywords, now).await?;

        info!(
            "🏷️  Rebuilt {} keywords from {} clusters ({} articles, {} associations)",
            keywords.len(),
            clusters.len(),
            unique,
            associations
        );

        Ok(MiningReport {
            loaded,
            unique,
            clusters: clusters.len(),
            keywords: keywords.len(),
            associations,
        })
    }

    /// Extract, merge, deduplicate by coverage and drop subsets.
    pub fn mine_clusters(&self, clusters: &[Vec<&Article>]) -> Vec<KeywordCandidate> {
        let mut merger = KeywordMerger::new();

        for cluster in clusters.iter().filter(|c| c.len() >= 2) {
            let article_ids: BTreeSet<String> = cluster.iter().map(|a| a.id.clone()).collect();
            let candidates = extract_candidates(cluster, &self.stopwords);

            for (raw, score) in select_top(&candidates, self.config.top_k) {
                if let Some(keyword) = canonicalize(&raw, &self.caser, self.config.min_keyword_len) {
                    merger.add(keyword, score, &article_ids);
                }
            }
        }

        let merged = merger.len();
        let distinct = dedup_by_coverage(merger.into_candidates());
        let distinct_count = distinct.len();
        let kept = eliminate_redundant(distinct);
        debug!(merged, distinct = distinct_count, kept = kept.len(), "keyword candidates reduced");
        kept
    }

    async fn persist(&self, keywords: &[KeywordCandidate], now: DateTime<Utc>) -> Result<usize> {
        let mut tx = self.storage.begin_keywords().await?;

        match write_keywords(tx.as_mut(), keywords, now, &self.config).await {
            Ok(associations) => {
                tx.commit().await?;
                Ok(associations)
            }
            Err(e) => {
                warn!("❌ Keyword rebuild failed, rolling back: {}", e);
                if let Err(rollback_error) = tx.rollback().await {
                    warn!("rollback failed: {}", rollback_error);
                }
                Err(e)
            }
        }
    }
}

async fn write_keywords(
    tx: &mut dyn KeywordTransaction,
    keywords: &[KeywordCandidate],
    now: DateTime<Utc>,
    config: &KeywordConfig,
) -> Result<usize> {
    let removed_links = tx.delete_all_associations().await?;
    let removed_keywords = tx.delete_all_keywords().await?;
    debug!(removed_links, removed_keywords, "previous keywords cleared");

    let keywords: Vec<&KeywordCandidate> = keywords.iter().filter(|k| k.articles.len() >= 2).collect();
    if keywords.is_empty() {
        return Ok(0);
    }

    let rows: Vec<KeywordRow> = keywords
        .iter()
        .map(|k| KeywordRow {
            id: Uuid::new_v4().to_string(),
            keyword: k.keyword.clone(),
            last_update: now,
        })
        .collect();
    for batch in rows.chunks(config.keyword_batch_size.max(1)) {
        tx.insert_keywords(batch).await?;
    }

    let names: Vec<String> = keywords.iter().map(|k| k.keyword.clone()).collect();
    let ids = tx.resolve_keyword_ids(&names).await?;

    let mut associations = Vec::new();
    for keyword in &keywords {
        let keyword_id = ids
            .get(&keyword.keyword)
            .ok_or_else(|| Error::storage(format!("keyword {:?} missing after insert", keyword.keyword)))?;
        associations.extend(keyword.articles.iter().map(|article_id| KeywordAssociation {
            keyword_id: keyword_id.clone(),
            article_id: article_id.clone(),
        }));
    }

    for batch in associations.chunks(config.association_batch_size.max(1)) {
        tx.insert_associations(batch).await?;
    }

    Ok(associations.len())
}
