use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use vt_core::{ArticleDraft, Error, Language, Result, Source};

use super::REGION;
use crate::feed::{clean_text, collect_drafts, local_id, parse_feed, FeedClient, FeedItem};
use crate::scrapers::{Scraper, SourceMetadata};

/// Item elements of the Welt feed that feed-rs does not expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeltExtras {
    pub premium: bool,
    pub topic: Option<String>,
}

impl WeltExtras {
    fn set(&mut self, element: &[u8], text: &str) {
        match element {
            b"premium" => self.premium = text.trim().eq_ignore_ascii_case("true"),
            b"topic" if !text.trim().is_empty() => self.topic = Some(text.trim().to_string()),
            _ => {}
        }
    }
}

/// Reads `<premium>` and `<topic>` of every `<item>`, keyed by GUID.
pub fn parse_extras(bytes: &[u8]) -> Result<HashMap<String, WeltExtras>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut extras = HashMap::new();
    let mut buf = Vec::new();
    let mut in_item = false;
    let mut element: Option<Vec<u8>> = None;
    let mut guid = String::new();
    let mut current = WeltExtras::default();

    loop {
        let text = match reader.read_event_into(&mut buf).map_err(|e| Error::Feed(e.to_string()))? {
            Event::Start(start) => {
                let name = start.local_name().as_ref().to_vec();
                if name == b"item" {
                    in_item = true;
                    guid.clear();
                    current = WeltExtras::default();
                } else if in_item {
                    element = Some(name);
                }
                None
            }
            Event::End(end) => {
                if end.local_name().as_ref() == b"item" {
                    in_item = false;
                    if !guid.is_empty() {
                        extras.insert(std::mem::take(&mut guid), std::mem::take(&mut current));
                    }
                }
                element = None;
                None
            }
            Event::Text(text) => Some(text.unescape().map_err(|e| Error::Feed(e.to_string()))?.into_owned()),
            Event::CData(data) => Some(String::from_utf8_lossy(&data).into_owned()),
            Event::Eof => break,
            _ => None,
        };
        buf.clear();

        if let (Some(name), Some(text)) = (element.as_deref(), text) {
            if name == b"guid" {
                guid = text.trim().to_string();
            } else {
                current.set(name, &text);
            }
        }
    }

    Ok(extras)
}

#[derive(Debug, Clone)]
pub struct WeltScraper {
    client: FeedClient,
}

impl WeltScraper {
    const FEED_URL: &'static str = "https://www.welt.de/feeds/topnews.rss";

    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    pub fn factory(client: FeedClient) -> Arc<dyn Scraper> {
        Arc::new(Self::new(client))
    }

    /// Premium items are skipped; the topic is appended to the categories.
    pub fn parse_items(items: Vec<FeedItem>, extras: &HashMap<String, WeltExtras>) -> Vec<ArticleDraft> {
        collect_drafts(items, |item, published| {
            let extra = extras.get(item.guid.trim()).cloned().unwrap_or_default();
            if extra.premium {
                debug!(link = %item.link, "premium article skipped");
                return None;
            }
            let mut category = item.categories;
            category.extend(extra.topic);
            Some(ArticleDraft {
                id: Source::Welt.article_id(&local_id(&item.guid, &item.link)),
                title: clean_text(&item.title),
                description: clean_text(&item.description),
                uri: item.link,
                source: Source::Welt,
                published_at: published,
                banner: item.image,
                category,
                language: Some(Language::German),
            })
        })
    }
}

#[async_trait]
impl Scraper for WeltScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::Welt,
            emoji: "🌍",
            region: REGION,
            feed_url: Self::FEED_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["welt"]
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        let bytes = self.client.fetch_bytes(Self::FEED_URL).await?;
        let items = parse_feed(&bytes)?;
        let extras = parse_extras(&bytes)?;
        Ok(Self::parse_items(items, &extras))
    }
}
