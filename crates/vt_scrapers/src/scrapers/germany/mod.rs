use crate::scrapers::{Region, ScraperFactory};

pub mod faz;
pub mod handelsblatt;
pub mod sueddeutsche;
pub mod tagesschau;
pub mod taz;
pub mod welt;
pub mod zeit;

pub use faz::FazScraper;
pub use handelsblatt::HandelsblattScraper;
pub use sueddeutsche::SueddeutscheScraper;
pub use tagesschau::TagesschauScraper;
pub use taz::TazScraper;
pub use welt::WeltScraper;
pub use zeit::ZeitScraper;

pub const REGION: Region = Region {
    name: "germany",
    emoji: "🇩🇪",
};

/// Returns the German newspaper adapters in ingestion order
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        ZeitScraper::factory as ScraperFactory,
        FazScraper::factory,
        TagesschauScraper::factory,
        SueddeutscheScraper::factory,
        WeltScraper::factory,
        HandelsblattScraper::factory,
        TazScraper::factory,
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedClient;

    #[test]
    fn test_cli_names_are_unique() {
        let client = FeedClient::new(FeedClient::DEFAULT_TIMEOUT).unwrap();
        let mut names: Vec<String> = get_scraper_factories()
            .into_iter()
            .flat_map(|f| f(client.clone()).cli_names().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(names.contains(&"zeit".to_string()));
        assert!(names.contains(&"sz".to_string()));
    }

    #[test]
    fn test_region_metadata() {
        let client = FeedClient::new(FeedClient::DEFAULT_TIMEOUT).unwrap();
        for factory in get_scraper_factories() {
            let meta = factory(client.clone()).source_metadata();
            assert_eq!(meta.region, REGION);
            assert!(meta.feed_url.starts_with("https://"));
        }
    }
}
