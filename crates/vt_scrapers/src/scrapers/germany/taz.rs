use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Language, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, local_id, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct TazScraper {
    client: FeedClient,
}

impl TazScraper {
    const FEED_URL: &'static str = "https://taz.de/!p4608;rss/";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    /// TAZ appends a "weiterlesen" anchor to every teaser.
    fn teaser(description: &str) -> String {
        let cleaned = clean_text(description);
        match cleaned.find("<a href") {
            Some(idx) => cleaned[..idx].trim().to_string(),
            None => cleaned,
        }
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            Some(ArticleDraft {
                id: Source::Taz.article_id(&local_id(&item.guid, &item.link)),
                title: clean_text(&item.title),
                description: Self::teaser(&item.description),
                uri: item.link,
                source: Source::Taz,
                published_at: published,
                banner: item.image,
                category: Vec::new(),
                language: Some(Language::German),
            })
        })
    }
}

#[async_trait]
impl Scraper for TazScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Taz,
            emoji: "🐾",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["taz"]
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        let items = self.client.fetch(Self::FEED_URL).await?;
        Ok(Self::parse_items(items))
    }
}
