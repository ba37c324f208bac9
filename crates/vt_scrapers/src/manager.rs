use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, error, info, warn};
use vt_analysis::{LinkReport, LinkResolver};
use vt_core::{
    AdapterError, Article, ArticleDraft, Error, LanguageClassifier, MetricsSink, NoopMetrics, Result,
};

use crate::feed::FeedClient;
use crate::scrapers::{get_scraper_factories, Scraper};

/// Job label used for ingestion metrics.
pub const JOB_NAME: &str = "ingest";

/// Articles gathered from every adapter in one fan-out, plus the adapters that failed.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub articles: Vec<ArticleDraft>,
    pub errors: Vec<AdapterError>,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub scraped: usize,
    /// Adapters that failed while others succeeded.
    pub errors: Vec<AdapterError>,
    pub link: LinkReport,
}

pub struct ScraperManager {
    scrapers: Vec<Arc<dyn Scraper>>,
    classifier: Arc<dyn LanguageClassifier>,
    resolver: Arc<LinkResolver>,
    metrics: Arc<dyn MetricsSink>,
    timeout: Duration,
}

impl ScraperManager {
    /// Manager over every known adapter, sharing one HTTP client.
    pub fn new(
        client: FeedClient,
        classifier: Arc<dyn LanguageClassifier>,
        resolver: Arc<LinkResolver>,
    ) -> Self {
        let scrapers = get_scraper_factories()
            .into_iter()
            .map(|factory| factory(client.clone()))
            .collect();
        Self::with_scrapers(scrapers, classifier, resolver)
    }

    pub fn with_scrapers(
        scrapers: Vec<Arc<dyn Scraper>>,
        classifier: Arc<dyn LanguageClassifier>,
        resolver: Arc<LinkResolver>,
    ) -> Self {
        Self {
            scrapers,
            classifier,
            resolver,
            metrics: Arc::new(NoopMetrics),
            timeout: FeedClient::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Upper bound for one adapter's whole fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scrapers(&self) -> &[Arc<dyn Scraper>] {
        &self.scrapers
    }

    /// Splits `country` or `country/name` into its parts.
    fn parse_source(source: &str) -> Result<(String, Option<String>)> {
        let mut parts = source.trim().splitn(2, '/');
        let country = parts.next().unwrap_or_default().to_lowercase();
        if country.is_empty() {
            return Err(Error::Invalid(format!("invalid source: {:?}", source)));
        }
        let name = parts
            .next()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty());
        Ok((country, name))
    }

    pub fn get_scrapers_for_source(&self, source: &str) -> Result<Vec<Arc<dyn Scraper>>> {
        let (country, name) = Self::parse_source(source)?;
        let result: Vec<_> = self
            .scrapers
            .iter()
            .filter(|scraper| {
                let meta = scraper.source_metadata();
                meta.region.name == country
                    && name.as_deref().map_or(true, |name| {
                        scraper.cli_names().contains(&name) || meta.source.slug() == name
                    })
            })
            .cloned()
            .collect();

        if result.is_empty() {
            return Err(Error::Invalid(format!("no scraper matches {:?}", source)));
        }
        Ok(result)
    }

    /// Restricts the manager to the adapters matching `source`.
    pub fn select(&mut self, source: &str) -> Result<()> {
        self.scrapers = self.get_scrapers_for_source(source)?;
        Ok(())
    }

    /// Runs every adapter concurrently. A failing adapter is recorded and the
    /// others continue. Fails only when nothing was fetched and some adapter failed.
    pub async fn scrape_all(&self) -> Result<ScrapeOutcome> {
        let handles: Vec<_> = self
            .scrapers
            .iter()
            .map(|scraper| {
                let scraper = scraper.clone();
                let metrics = self.metrics.clone();
                let timeout = self.timeout;
                tokio::spawn(async move { fetch_source(scraper, metrics, timeout).await })
            })
            .collect();

        let mut outcome = ScrapeOutcome::default();
        for (scraper, joined) in self.scrapers.iter().zip(join_all(handles).await) {
            let source = scraper.source();
            match joined {
                Ok(Ok(drafts)) => outcome.articles.extend(drafts),
                Ok(Err(e)) => outcome.errors.push(AdapterError::new(source, e)),
                Err(e) => {
                    self.metrics.scraper_error(source.slug());
                    error!("❌ {} task aborted: {}", source, e);
                    outcome
                        .errors
                        .push(AdapterError::new(source, Error::Scraping(format!("task failed: {}", e))));
                }
            }
        }

        if outcome.articles.is_empty() && !outcome.errors.is_empty() {
            return Err(Error::AllScrapersFailed(outcome.errors));
        }

        info!(
            articles = outcome.articles.len(),
            errors = outcome.errors.len(),
            "📰 Scraping finished"
        );
        Ok(outcome)
    }

    /// Keeps an adapter's language when it set one, otherwise detects it from
    /// title and description.
    pub fn classify(&self, drafts: Vec<ArticleDraft>) -> Vec<Article> {
        drafts
            .into_iter()
            .map(|draft| {
                let language = match draft.language {
                    Some(language) => language,
                    None => {
                        let text = format!("{} {}", draft.title, draft.description);
                        self.classifier.classify_or_unknown(&text)
                    }
                };
                debug!(id = %draft.id, %language, "🏷️ language assigned");
                draft.into_article(language)
            })
            .collect()
    }

    /// One ingestion cycle: fan-out, language detection, linking and persistence.
    pub async fn run(&self) -> Result<IngestReport> {
        self.metrics.job_run(JOB_NAME);
        let started = Instant::now();

        let result = self.run_cycle().await;

        let elapsed = started.elapsed();
        self.metrics.job_duration(JOB_NAME, elapsed.as_secs_f64());
        match &result {
            Ok(report) => info!(
                scraped = report.scraped,
                errors = report.errors.len(),
                inserted = report.link.inserted,
                links = report.link.links,
                duration_ms = elapsed.as_millis() as u64,
                "✅ Ingest cycle finished"
            ),
            Err(e) => {
                self.metrics.job_error(JOB_NAME);
                error!("❌ Ingest cycle failed: {}", e);
            }
        }
        result
    }

    async fn run_cycle(&self) -> Result<IngestReport> {
        let ScrapeOutcome { articles, errors } = self.scrape_all().await?;
        for err in &errors {
            warn!("⚠️ {}", err);
        }

        let scraped = articles.len();
        let articles = self.classify(articles);
        let link = self.resolver.resolve(articles).await?;

        Ok(IngestReport { scraped, errors, link })
    }
}

async fn fetch_source(
    scraper: Arc<dyn Scraper>,
    metrics: Arc<dyn MetricsSink>,
    limit: Duration,
) -> Result<Vec<ArticleDraft>> {
    let meta = scraper.source_metadata();
    let slug = meta.source.slug();
    metrics.scraper_request(slug);
    info!("{} Fetching {}", meta.emoji, meta.source);

    let started = Instant::now();
    let result = match tokio::time::timeout(limit, scraper.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            source_name: slug.to_string(),
            seconds: limit.as_secs(),
        }),
    };
    metrics.scraper_duration(slug, started.elapsed().as_secs_f64());

    match &result {
        Ok(drafts) => {
            metrics.articles_scraped(slug, drafts.len());
            info!(source = slug, count = drafts.len(), "✅ {} fetched", meta.source);
        }
        Err(e) => {
            metrics.scraper_error(slug);
            error!(source = slug, "❌ {} failed: {}", meta.source, e);
        }
    }
    result
}
