use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, first_image, local_id, strip_html, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct SueddeutscheScraper {
    client: FeedClient,
}

impl SueddeutscheScraper {
    const FEED_URL: &'static str = "https://rss.sueddeutsche.de/rss/Topthemen";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            let raw = clean_text(&item.description);
            Some(ArticleDraft {
                id: Source::Sueddeutsche.article_id(&local_id(&item.guid, &item.link)),
                title: clean_text(&item.title),
                description: strip_html(&raw),
                uri: item.link,
                source: Source::Sueddeutsche,
                published_at: published,
                banner: first_image(&raw),
                category: item.categories,
                language: None,
            })
        })
    }
}

#[async_trait]
impl Scraper for SueddeutscheScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Sueddeutsche,
            emoji: "🥨",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["sueddeutsche", "sz"]
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        let items = self.client.fetch(Self::FEED_URL).await?;
        Ok(Self::parse_items(items))
    }
}
