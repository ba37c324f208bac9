use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Result, Source};

use crate::feed::FeedClient;

pub mod germany;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceMetadata {
    pub source: Source,
    pub emoji: &'static str,
    pub region: Region,
    pub feed_url: &'static str,
}

/// A source adapter: fetches one feed and normalizes its entries.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    fn source(&self) -> Source {
        self.source_metadata().source
    }

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// Fetches the feed once and returns its normalized articles.
    async fn fetch(&self) -> Result<Vec<ArticleDraft>>;
}

pub type ScraperFactory = fn(FeedClient) -> Arc<dyn Scraper>;

/// Every adapter this build knows about.
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    germany::get_scraper_factories()
}
