use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, local_id, strip_html, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct ZeitScraper {
    client: FeedClient,
}

impl ZeitScraper {
    const FEED_URL: &'static str = "https://newsfeed.zeit.de/index";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            let mut description = clean_text(&item.description);
            // Some entries only carry a body, which is "None" when Zeit has nothing.
            if description.is_empty() {
                if let Some(content) = item.content.as_deref() {
                    let text = strip_html(&clean_text(content));
                    if text != "None" {
                        description = text;
                    }
                }
            }

            let guid = item
                .guid
                .trim()
                .trim_start_matches("{urn:uuid:")
                .trim_start_matches("urn:uuid:")
                .trim_end_matches('}');

            Some(ArticleDraft {
                id: Source::Zeit.article_id(&local_id(guid, &item.link)),
                title: clean_text(&item.title),
                description,
                uri: item.link,
                source: Source::Zeit,
                published_at: published,
                banner: item.image,
                category: item.categories,
                language: None,
            })
        })
    }
}

#[async_trait]
impl Scraper for ZeitScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Zeit,
            emoji: "🕰️",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["zeit", "diezeit"]
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        let items = self.client.fetch(Self::FEED_URL).await?;
        Ok(Self::parse_items(items))
    }
}
