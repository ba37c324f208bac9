use std::collections::BTreeMap;
use std::sync::Mutex;

/// Fire-and-forget counters and timings for adapters and jobs.
pub trait MetricsSink: Send + Sync {
    fn scraper_request(&self, source: &str);
    fn scraper_error(&self, source: &str);
    fn scraper_duration(&self, source: &str, seconds: f64);
    fn articles_scraped(&self, source: &str, count: usize);
    fn job_run(&self, job: &str);
    fn job_error(&self, job: &str);
    fn job_duration(&self, job: &str, seconds: f64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn scraper_request(&self, _source: &str) {}
    fn scraper_error(&self, _source: &str) {}
    fn scraper_duration(&self, _source: &str, _seconds: f64) {}
    fn articles_scraped(&self, _source: &str, _count: usize) {}
    fn job_run(&self, _job: &str) {}
    fn job_error(&self, _job: &str) {}
    fn job_duration(&self, _job: &str, _seconds: f64) {}
}

/// Keeps counters in memory, keyed by `<metric>/<label>`. Durations count
/// observations.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: Mutex<BTreeMap<String, u64>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, metric: &str, label: &str, value: u64) {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counters.entry(format!("{}/{}", metric, label)).or_insert(0) += value;
    }

    pub fn get(&self, metric: &str, label: &str) -> u64 {
        let counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters.get(&format!("{}/{}", metric, label)).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        match self.counters.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MetricsSink for InMemoryMetrics {
    fn scraper_request(&self, source: &str) {
        self.add("scraper_requests", source, 1);
    }

    fn scraper_error(&self, source: &str) {
        self.add("scraper_errors", source, 1);
    }

    fn scraper_duration(&self, source: &str, _seconds: f64) {
        self.add("scraper_duration", source, 1);
    }

    fn articles_scraped(&self, source: &str, count: usize) {
        self.add("articles_scraped", source, count as u64);
    }

    fn job_run(&self, job: &str) {
        self.add("job_runs", job, 1);
    }

    fn job_error(&self, job: &str) {
        self.add("job_errors", job, 1);
    }

    fn job_duration(&self, job: &str, _seconds: f64) {
        self.add("job_duration", job, 1);
    }
}
