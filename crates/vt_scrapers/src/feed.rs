//! Shared HTTP client and feed parsing for the RSS and RDF adapters.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use tracing::debug;
use vt_core::{ArticleDraft, Error, Result};

const USER_AGENT: &str = concat!("veritas/", env!("CARGO_PKG_VERSION"));

/// One feed entry, reduced to the fields the adapters read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub guid: String,
    pub title: String,
    /// Raw description, may contain markup.
    pub description: String,
    /// Full body (`content:encoded`) when the feed ships one.
    pub content: Option<String>,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    /// First JPEG enclosure or media object.
    pub image: Option<String>,
}

impl From<feed_rs::model::Entry> for FeedItem {
    fn from(entry: feed_rs::model::Entry) -> Self {
        let image = entry
            .media
            .iter()
            .flat_map(|media| media.content.iter())
            .find(|content| {
                content
                    .content_type
                    .as_ref()
                    .is_some_and(|mime| mime.essence().to_string() == "image/jpeg")
            })
            .and_then(|content| content.url.as_ref())
            .map(|url| url.to_string());

        FeedItem {
            guid: entry.id,
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            description: entry.summary.map(|t| t.content).unwrap_or_default(),
            content: entry.content.and_then(|c| c.body),
            link: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
            published: entry.published.or(entry.updated),
            categories: entry.categories.into_iter().map(|c| c.term).collect(),
            image,
        }
    }
}

/// Pooled HTTP client shared by every adapter. Each request is bounded by the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Raw response body, for adapters that read elements feed-rs drops.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        let bytes = self.fetch_bytes(url).await?;
        let items = parse_feed(&bytes)?;
        debug!(url, items = items.len(), "feed parsed");
        Ok(items)
    }
}

/// Parses RSS 2.0, RSS 1.0 (RDF) or Atom.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| Error::Feed(e.to_string()))?;
    Ok(feed.entries.into_iter().map(FeedItem::from).collect())
}

/// Applies the rules every adapter shares: duplicate GUIDs within one fetch,
/// entries without a publish date and entries whose converted description is
/// empty are dropped.
pub fn collect_drafts<F>(items: Vec<FeedItem>, mut convert: F) -> Vec<ArticleDraft>
where
    F: FnMut(FeedItem, DateTime<Utc>) -> Option<ArticleDraft>,
{
    let mut seen = HashSet::with_capacity(items.len());
    let mut drafts = Vec::with_capacity(items.len());

    for item in items {
        if !item.guid.is_empty() && !seen.insert(item.guid.clone()) {
            continue;
        }
        let Some(published) = item.published else {
            debug!(guid = %item.guid, "entry without publish date skipped");
            continue;
        };
        match convert(item, published) {
            Some(draft) if !draft.description.trim().is_empty() => drafts.push(draft),
            _ => {}
        }
    }

    drafts
}

/// Removes CDATA markers left by sloppy feeds and trims.
pub fn clean_text(text: &str) -> String {
    text.replace("<![CDATA[", "").replace("]]>", "").trim().to_string()
}

/// Text content of an HTML fragment with whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `src` of the first `<img>` in an HTML fragment.
pub fn first_image(html: &str) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    let fragment = Html::parse_fragment(html);
    let src = fragment.select(&selector).next()?.value().attr("src")?;
    Some(src.to_string())
}

/// Text of the first `<p>` that has any.
pub fn first_paragraph(html: &str) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&selector)
        .map(|p| p.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|text| !text.is_empty())
}

/// The GUID when present, otherwise a stable hash of the link.
pub fn local_id(guid: &str, link: &str) -> String {
    let guid = guid.trim();
    if !guid.is_empty() {
        return guid.to_string();
    }
    let digest = Sha256::digest(link.as_bytes());
    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Schlagzeilen</title>
    <link>https://www.handelsblatt.com</link>
    <description>Test</description>
    <item>
      <title><![CDATA[Dax schließt im Plus]]></title>
      <link>https://www.handelsblatt.com/finanzen/dax-100.html</link>
      <description><![CDATA[Anleger setzen auf sinkende Zinsen.]]></description>
      <pubDate>Thu, 08 May 2025 19:51:16 +0200</pubDate>
      <guid isPermaLink="false">hb-100</guid>
      <category>Finanzen</category>
      <category>Märkte</category>
      <enclosure url="https://www.handelsblatt.com/img/dax.jpg" type="image/jpeg" length="0"/>
    </item>
    <item>
      <title>Ohne Datum</title>
      <link>https://www.handelsblatt.com/politik/ohne-datum.html</link>
      <description>Kein pubDate vorhanden.</description>
      <guid isPermaLink="false">hb-101</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.guid, "hb-100");
        assert_eq!(first.title, "Dax schließt im Plus");
        assert_eq!(first.description, "Anleger setzen auf sinkende Zinsen.");
        assert_eq!(first.link, "https://www.handelsblatt.com/finanzen/dax-100.html");
        assert_eq!(first.published, Some(Utc.with_ymd_and_hms(2025, 5, 8, 17, 51, 16).unwrap()));
        assert_eq!(first.categories, vec!["Finanzen", "Märkte"]);
        assert_eq!(first.image.as_deref(), Some("https://www.handelsblatt.com/img/dax.jpg"));

        assert_eq!(items[1].published, None);
    }

    #[test]
    fn test_parse_garbage_is_feed_error() {
        let err = parse_feed(b"<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, Error::Feed(_)));
    }

    fn item(guid: &str, description: &str, published: bool) -> FeedItem {
        FeedItem {
            guid: guid.to_string(),
            title: format!("Titel {}", guid),
            description: description.to_string(),
            link: format!("https://example.com/{}", guid),
            published: published.then(|| Utc.with_ymd_and_hms(2025, 5, 8, 12, 0, 0).unwrap()),
            ..FeedItem::default()
        }
    }

    #[test]
    fn test_collect_drafts_applies_shared_rules() {
        let items = vec![
            item("1", "Erste Meldung", true),
            item("1", "Doppelte Meldung", true),
            item("2", "Ohne Datum", false),
            item("3", "   ", true),
            item("4", "Vierte Meldung", true),
        ];
        let drafts = collect_drafts(items, |item, published| {
            Some(ArticleDraft {
                id: vt_core::Source::Zeit.article_id(&item.guid),
                title: item.title,
                description: item.description,
                uri: item.link,
                source: vt_core::Source::Zeit,
                published_at: published,
                banner: None,
                category: vec![],
                language: None,
            })
        });
        let ids: Vec<&str> = drafts.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["zeit-1", "zeit-4"]);
        assert_eq!(drafts[0].description, "Erste Meldung");
    }

    #[test]
    fn test_html_helpers() {
        let html = r#"<p><img src="https://img.example/a.jpg" alt=""></p><p>Der  Kanzler
            reist <b>heute</b> ab.</p><p>Mehr</p>"#;
        assert_eq!(first_image(html).as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(first_paragraph(html).as_deref(), Some("Der Kanzler reist heute ab."));
        assert_eq!(strip_html(html), "Der Kanzler reist heute ab.Mehr");
        assert_eq!(first_image("kein bild"), None);
    }

    #[test]
    fn test_clean_text_and_local_id() {
        assert_eq!(clean_text("  <![CDATA[Titel]]> "), "Titel");
        assert_eq!(local_id(" 42 ", "https://example.com/a"), "42");
        let hashed = local_id("", "https://example.com/a");
        assert_eq!(hashed.len(), 32);
        assert_eq!(hashed, local_id("", "https://example.com/a"));
        assert_ne!(hashed, local_id("", "https://example.com/b"));
    }
}
