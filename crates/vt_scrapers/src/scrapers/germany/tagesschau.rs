use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, first_image, local_id, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct TagesschauScraper {
    client: FeedClient,
}

impl TagesschauScraper {
    const FEED_URL: &'static str = "https://www.tagesschau.de/infoservices/alle-meldungen-100~rdf.xml";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            let banner = item.content.as_deref().and_then(first_image);
            Some(ArticleDraft {
                id: Source::Tagesschau.article_id(&local_id(&item.guid, &item.link)),
                title: clean_text(&item.title),
                description: clean_text(&item.description),
                uri: item.link,
                source: Source::Tagesschau,
                published_at: published,
                banner,
                category: Vec::new(),
                language: None,
            })
        })
    }
}

#[async_trait]
impl Scraper for TagesschauScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Tagesschau,
            emoji: "📺",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["tagesschau", "ard"]
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        let items = self.client.fetch(Self::FEED_URL).await?;
        Ok(Self::parse_items(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::germany::fixtures::item;

    #[test]
    fn test_banner_from_encoded_content() {
        let mut entry = item("ts-123", "Unwetter im Süden", "Starkregen sorgt für Überschwemmungen.");
        entry.content = Some(r#"<p><img src="https://images.tagesschau.de/1.jpg" alt="Regen"></p><p>Text</p>"#.to_string());
        entry.categories = vec!["Inland".to_string()];

        let drafts = TagesschauScraper::parse_items(vec![entry]);
        assert_eq!(drafts[0].id, "tagesschau-ts-123");
        assert_eq!(drafts[0].banner.as_deref(), Some("https://images.tagesschau.de/1.jpg"));
        assert!(drafts[0].category.is_empty());
    }

    #[test]
    fn test_missing_guid_hashes_link() {
        let mut entry = item("", "Titel", "Beschreibung");
        entry.link = "https://www.tagesschau.de/inland/meldung-100.html".to_string();
        let drafts = TagesschauScraper::parse_items(vec![entry]);
        assert!(drafts[0].id.starts_with("tagesschau-"));
        assert_eq!(drafts[0].id.len(), "tagesschau-".len() + 32);
    }
}
