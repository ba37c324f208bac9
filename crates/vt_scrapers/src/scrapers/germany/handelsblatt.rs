use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, local_id, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct HandelsblattScraper {
    client: FeedClient,
}

impl HandelsblattScraper {
    const FEED_URL: &'static str = "https://www.handelsblatt.com/contentexport/feed/schlagzeilen";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            // Only the section is meaningful, the rest are tracking tags.
            let category = item.categories.into_iter().take(1).collect();
            Some(ArticleDraft {
                id: Source::Handelsblatt.article_id(&local_id(&item.guid, &item.link)),
                title: clean_text(&item.title),
                description: clean_text(&item.description),
                uri: item.link,
                source: Source::Handelsblatt,
                published_at: published,
                banner: item.image,
                category,
                language: None,
            })
        })
    }
}

#[async_trait]
impl Scraper for HandelsblattScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Handelsblatt,
            emoji: "💶",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["handelsblatt", "hb"]
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
    fn test_keeps_first_category_only() {
        let mut entry = item("100", "Dax schließt im Plus", "Anleger setzen auf sinkende Zinsen.");
        entry.categories = vec!["Finanzen".to_string(), "Märkte".to_string()];
        entry.image = Some("https://www.handelsblatt.com/img/dax.jpg".to_string());

        let drafts = HandelsblattScraper::parse_items(vec![entry]);
        assert_eq!(drafts[0].id, "handelsblatt-100");
        assert_eq!(drafts[0].category, vec!["Finanzen"]);
        assert_eq!(drafts[0].banner.as_deref(), Some("https://www.handelsblatt.com/img/dax.jpg"));
    }

    #[test]
    fn test_parses_fixture_feed() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>HB</title><link>https://www.handelsblatt.com</link><description>x</description>
<item><title>Zinsen sinken</title><link>https://www.handelsblatt.com/a-1.html</link>
<description>Die EZB senkt den Leitzins.</description><pubDate>Fri, 09 May 2025 08:00:00 +0200</pubDate>
<guid isPermaLink="false">200</guid><category>Finanzen</category><category>EZB</category></item>
</channel></rss>"#;
        let items = crate::feed::parse_feed(xml.as_bytes()).unwrap();
        let drafts = HandelsblattScraper::parse_items(items);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, "handelsblatt-200");
        assert_eq!(drafts[0].category, vec!["Finanzen"]);
    }
}
