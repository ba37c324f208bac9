use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};
use vt_analysis::{KeywordMiner, LinkResolver, MiningReport, SimilarityScorer, Stopwords, WhatlangClassifier};
use vt_core::{days_before, ArticleStorage, KeyWords, MetricsSink, Result};
use vt_scrapers::{FeedClient, IngestReport, ScraperManager};

use crate::config::PipelineConfig;

pub const CLEANUP_JOB: &str = "cleanup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Ingest,
    Maintenance,
}

/// Wires storage, adapters, linker and miner together for the commands.
pub struct App {
    storage: Arc<dyn ArticleStorage>,
    manager: ScraperManager,
    miner: KeywordMiner,
    metrics: Arc<dyn MetricsSink>,
    config: PipelineConfig,
}

impl App {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        metrics: Arc<dyn MetricsSink>,
        config: PipelineConfig,
    ) -> Result<Self> {
        let client = FeedClient::new(config.scraper.timeout())?;
        Self::with_manager(storage, metrics, config, |classifier, resolver| {
            ScraperManager::new(client, classifier, resolver)
        })
    }

    /// Like [`App::new`] but the caller decides which adapters the manager runs.
    pub fn with_manager<F>(
        storage: Arc<dyn ArticleStorage>,
        metrics: Arc<dyn MetricsSink>,
        config: PipelineConfig,
        build: F,
    ) -> Result<Self>
    where
        F: FnOnce(Arc<WhatlangClassifier>, Arc<LinkResolver>) -> ScraperManager,
    {
        let stopwords = Arc::new(Stopwords::new());
        let scorer = Arc::new(SimilarityScorer::new(config.similarity.clone(), stopwords.clone()));
        let resolver = Arc::new(LinkResolver::new(storage.clone(), scorer.clone(), config.link.clone()));
        let classifier = Arc::new(WhatlangClassifier::new());

        let manager = build(classifier, resolver)
            .with_metrics(metrics.clone())
            .with_timeout(config.scraper.adapter_timeout());
        let miner = KeywordMiner::new(storage.clone(), scorer, stopwords, config.keywords.clone())
            .with_metrics(metrics.clone());

        Ok(Self { storage, manager, miner, metrics, config })
    }

    pub fn manager(&self) -> &ScraperManager {
        &self.manager
    }

    pub fn select_source(&mut self, source: &str) -> Result<()> {
        self.manager.select(source)
    }

    pub async fn ingest(&self) -> Result<IngestReport> {
        self.manager.run().await
    }

    pub async fn mine_keywords(&self) -> Result<MiningReport> {
        self.miner.run(Utc::now()).await
    }

    pub async fn stored_keywords(&self) -> Result<Vec<KeyWords>> {
        self.storage.load_keywords().await
    }

    /// Deletes articles published more than `days` ago, with their edges and
    /// keyword associations.
    pub async fn cleanup(&self, days: Option<i64>) -> Result<u64> {
        let days = days.unwrap_or(self.config.schedule.retention_days);
        self.metrics.job_run(CLEANUP_JOB);
        let started = Instant::now();

        let result = match days_before(Utc::now(), days) {
            Ok(cutoff) => self.storage.delete_published_before(cutoff).await,
            Err(e) => Err(e),
        };

        self.metrics.job_duration(CLEANUP_JOB, started.elapsed().as_secs_f64());
        match &result {
            Ok(deleted) => info!(deleted, days, "🧹 Cleanup finished"),
            Err(e) => {
                self.metrics.job_error(CLEANUP_JOB);
                error!("❌ Cleanup failed: {}", e);
            }
        }
        result
    }

    /// Repeats ingestion every `every` until Ctrl-C.
    pub async fn scrape_periodically(&self, every: Duration) {
        info!("⏱️ Running in periodic mode every {}s", every.as_secs());
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => break,
            }
            tokio::select! {
                _ = self.log_ingest() => {}
                _ = tokio::signal::ctrl_c() => {
                    warn!("🛑 Interrupted, abandoning ingest cycle");
                    break;
                }
            }
        }
        info!("👋 Stopped");
    }

    /// Ingest and mine once, then ingest on the ingest interval and run
    /// cleanup plus mining on the maintenance interval. Ctrl-C abandons the
    /// running cycle and stops.
    pub async fn run_scheduler(&self) {
        let ingest_every = Duration::from_secs(self.config.schedule.ingest_interval_secs.max(1));
        let maintenance_every = Duration::from_secs(self.config.schedule.maintenance_interval_secs.max(1));

        let startup = async {
            self.log_ingest().await;
            self.log_keywords().await;
        };
        tokio::select! {
            _ = startup => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("🛑 Interrupted during start-up cycle");
                return;
            }
        }

        let start = tokio::time::Instant::now();
        let mut ingest = tokio::time::interval_at(start + ingest_every, ingest_every);
        let mut maintenance = tokio::time::interval_at(start + maintenance_every, maintenance_every);

        loop {
            let job = tokio::select! {
                _ = ingest.tick() => Job::Ingest,
                _ = maintenance.tick() => Job::Maintenance,
                _ = tokio::signal::ctrl_c() => break,
            };
            tokio::select! {
                _ = self.execute(job) => {}
                _ = tokio::signal::ctrl_c() => {
                    warn!("🛑 Interrupted, abandoning {:?}", job);
                    break;
                }
            }
        }
        info!("👋 Scheduler stopped");
    }

    async fn execute(&self, job: Job) {
        match job {
            Job::Ingest => self.log_ingest().await,
            Job::Maintenance => {
                let _ = self.cleanup(None).await;
                self.log_keywords().await;
            }
        }
    }

    // Failures are already logged and counted by the jobs themselves.
    async fn log_ingest(&self) {
        let _ = self.ingest().await;
    }

    async fn log_keywords(&self) {
        let _ = self.mine_keywords().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use vt_core::{ArticleDraft, InMemoryMetrics, Language, Source};
    use vt_scrapers::scrapers::germany::REGION;
    use vt_scrapers::{Scraper, SourceMetadata};
    use vt_storage::InMemoryStorage;

    struct FixedScraper {
        drafts: Vec<ArticleDraft>,
    }

    #[async_trait]
    impl Scraper for FixedScraper {
        fn source_metadata(&self) -> SourceMetadata {
            SourceMetadata {
                source: Source::Tagesschau,
                emoji: "🧪",
                region: REGION,
                feed_url: "https://example.com/rdf",
            }
        }

        async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
            Ok(self.drafts.clone())
        }
    }

    fn draft(local: &str, days_old: i64) -> ArticleDraft {
        ArticleDraft {
            id: Source::Tagesschau.article_id(local),
            title: format!("Meldung Nummer {} aus Berlin", local),
            description: "Eine ausreichend lange Beschreibung der Meldung.".to_string(),
            uri: format!("https://www.tagesschau.de/{}.html", local),
            source: Source::Tagesschau,
            published_at: Utc::now() - ChronoDuration::days(days_old),
            banner: None,
            category: vec![],
            language: Some(Language::German),
        }
    }

    fn app(storage: Arc<InMemoryStorage>, metrics: Arc<InMemoryMetrics>, drafts: Vec<ArticleDraft>) -> App {
        App::with_manager(storage, metrics, PipelineConfig::default(), |classifier, resolver| {
            ScraperManager::with_scrapers(vec![Arc::new(FixedScraper { drafts }) as Arc<dyn Scraper>], classifier, resolver)
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_then_cleanup() {
        let storage = Arc::new(InMemoryStorage::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let app = app(storage.clone(), metrics.clone(), vec![draft("1", 1), draft("2", 10)]);

        let report = app.ingest().await.unwrap();
        assert_eq!(report.scraped, 2);
        assert_eq!(storage.load_all().await.unwrap().len(), 2);

        let deleted = app.cleanup(None).await.unwrap();
        assert_eq!(deleted, 1);
        let remaining = storage.load_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "tagesschau-1");

        assert_eq!(metrics.get("job_runs", CLEANUP_JOB), 1);
        assert_eq!(metrics.get("job_runs", "ingest"), 1);
    }

    #[tokio::test]
    async fn test_cleanup_with_explicit_days() {
        let storage = Arc::new(InMemoryStorage::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let app = app(storage.clone(), metrics, vec![draft("1", 1), draft("2", 3)]);
        app.ingest().await.unwrap();

        assert_eq!(app.cleanup(Some(2)).await.unwrap(), 1);
        assert_eq!(app.cleanup(Some(2)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_rejects_out_of_range_days() {
        let storage = Arc::new(InMemoryStorage::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let app = app(storage.clone(), metrics.clone(), vec![draft("1", 0)]);
        app.ingest().await.unwrap();

        assert!(matches!(app.cleanup(Some(-1)).await, Err(vt_core::Error::Invalid(_))));
        assert!(matches!(app.cleanup(Some(100_000_000)).await, Err(vt_core::Error::Invalid(_))));
        assert_eq!(storage.load_all().await.unwrap().len(), 1);
        assert_eq!(metrics.get("job_errors", CLEANUP_JOB), 2);
    }

    #[tokio::test]
    async fn test_mining_on_empty_store_reports_nothing() {
        let storage = Arc::new(InMemoryStorage::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let app = app(storage, metrics.clone(), vec![]);

        let report = app.mine_keywords().await.unwrap();
        assert_eq!(report, MiningReport::default());
        assert!(app.stored_keywords().await.unwrap().is_empty());
        assert_eq!(metrics.get("job_runs", "keywords"), 1);
    }
}
