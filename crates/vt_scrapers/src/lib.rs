pub mod feed;
pub mod manager;
pub mod scrapers;

pub use feed::{FeedClient, FeedItem};
pub use manager::{IngestReport, ScrapeOutcome, ScraperManager};
pub use scrapers::{get_scraper_factories, Region, Scraper, ScraperFactory, SourceMetadata};

pub mod prelude {
    pub use super::scrapers::germany::*;
    pub use super::{FeedClient, IngestReport, Scraper, ScraperManager};
}
