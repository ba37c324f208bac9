use std::sync::Arc;

use async_trait::async_trait;
use vt_core::{ArticleDraft, Language, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, first_paragraph, local_id, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct FazScraper {
    client: FeedClient,
}

impl FazScraper {
    const FEED_URL: &'static str = "https://www.faz.net/rss/aktuell/";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    /// FAZ GUIDs are article URLs ending in `-<number>.html`.
    fn local_part(guid: &str) -> &str {
        let last = guid.rsplit('-').next().unwrap_or(guid);
        last.trim_end_matches(".html")
    }

    pub fn parse_items(items: Vec<FeedItem>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            let raw = clean_text(&item.description);
            let description = if raw.contains('<') {
                first_paragraph(&raw).unwrap_or_default()
            } else {
                raw
            };

            Some(ArticleDraft {
                id: Source::Faz.article_id(&local_id(Self::local_part(item.guid.trim()), &item.link)),
                title: clean_text(&item.title),
                description,
                uri: item.link,
                source: Source::Faz,
                published_at: published,
                banner: item.image,
                category: item.categories,
                language: Some(Language::German),
            })
        })
    }
}

#[async_trait]
impl Scraper for FazScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Faz,
            emoji: "📜",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["faz"]
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
    fn test_id_from_url_guid() {
        let drafts = FazScraper::parse_items(vec![item(
            "https://www.faz.net/aktuell/politik/inland/bundestag-debattiert-haushalt-110456789.html",
            "Bundestag debattiert Haushalt",
            "Die Opposition kritisiert die Schuldenpläne.",
        )]);
        assert_eq!(drafts[0].id, "faz-110456789");
        assert_eq!(drafts[0].language, Some(Language::German));
    }

    #[test]
    fn test_description_is_first_text_paragraph() {
        let entry = item(
            "a-1.html",
            "Titel",
            r#"<p><img src="https://media.faz.net/1.jpg"></p><p> Erster Absatz mit Inhalt. </p><p>Zweiter</p>"#,
        );
        let image_only = item("a-2.html", "Titel", r#"<p><img src="https://media.faz.net/2.jpg"></p>"#);
        let drafts = FazScraper::parse_items(vec![entry, image_only]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, "faz-1");
        assert_eq!(drafts[0].description, "Erster Absatz mit Inhalt.");
    }
}
