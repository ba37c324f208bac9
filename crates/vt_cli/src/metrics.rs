use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use vt_core::MetricsSink;

/// Prometheus-backed metrics for adapters and jobs.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    scraper_requests: IntCounterVec,
    scraper_errors: IntCounterVec,
    scraper_duration: HistogramVec,
    articles_scraped: IntCounterVec,
    job_runs: IntCounterVec,
    job_errors: IntCounterVec,
    job_duration: HistogramVec,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let scraper_requests = IntCounterVec::new(
            Opts::new("veritas_scraper_requests_total", "Feed fetches started per source"),
            &["source"],
        )?;
        let scraper_errors = IntCounterVec::new(
            Opts::new("veritas_scraper_errors_total", "Failed feed fetches per source"),
            &["source"],
        )?;
        let scraper_duration = HistogramVec::new(
            HistogramOpts::new("veritas_scraper_duration_seconds", "Feed fetch duration per source"),
            &["source"],
        )?;
        let articles_scraped = IntCounterVec::new(
            Opts::new("veritas_articles_scraped_total", "Articles returned per source"),
            &["source"],
        )?;
        let job_runs = IntCounterVec::new(
            Opts::new("veritas_job_runs_total", "Job executions"),
            &["job"],
        )?;
        let job_errors = IntCounterVec::new(
            Opts::new("veritas_job_errors_total", "Failed job executions"),
            &["job"],
        )?;
        let job_duration = HistogramVec::new(
            HistogramOpts::new("veritas_job_duration_seconds", "Job duration")
                .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
            &["job"],
        )?;

        registry.register(Box::new(scraper_requests.clone()))?;
        registry.register(Box::new(scraper_errors.clone()))?;
        registry.register(Box::new(scraper_duration.clone()))?;
        registry.register(Box::new(articles_scraped.clone()))?;
        registry.register(Box::new(job_runs.clone()))?;
        registry.register(Box::new(job_errors.clone()))?;
        registry.register(Box::new(job_duration.clone()))?;

        Ok(Self {
            registry,
            scraper_requests,
            scraper_errors,
            scraper_duration,
            articles_scraped,
            job_runs,
            job_errors,
            job_duration,
        })
    }

    /// Text exposition format of every registered metric.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricsSink for PrometheusMetrics {
    fn scraper_request(&self, source: &str) {
        self.scraper_requests.with_label_values(&[source]).inc();
    }

    fn scraper_error(&self, source: &str) {
        self.scraper_errors.with_label_values(&[source]).inc();
    }

    fn scraper_duration(&self, source: &str, seconds: f64) {
        self.scraper_duration.with_label_values(&[source]).observe(seconds);
    }

    fn articles_scraped(&self, source: &str, count: usize) {
        self.articles_scraped.with_label_values(&[source]).inc_by(count as u64);
    }

    fn job_run(&self, job: &str) {
        self.job_runs.with_label_values(&[job]).inc();
    }

    fn job_error(&self, job: &str) {
        self.job_errors.with_label_values(&[job]).inc();
    }

    fn job_duration(&self, job: &str, seconds: f64) {
        self.job_duration.with_label_values(&[job]).observe(seconds);
    }
}
