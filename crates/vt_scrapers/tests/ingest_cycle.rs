use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use vt_analysis::{LinkConfig, LinkResolver, SimilarityScorer, WhatlangClassifier};
use vt_core::{ArticleDraft, ArticleStorage, Error, InMemoryMetrics, Language, Result, Source};
use vt_scrapers::scrapers::germany::REGION;
use vt_scrapers::{Scraper, ScraperManager, SourceMetadata};
use vt_storage::InMemoryStorage;

enum Behavior {
    Articles(Vec<ArticleDraft>),
    Fail,
    Hang,
}

struct MockScraper {
    source: Source,
    behavior: Behavior,
}

#[async_trait]
impl Scraper for MockScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: self.source,
            emoji: "🧪",
            region: REGION,
            feed_url: "https://example.com/feed",
        }
    }

    async fn fetch(&self) -> Result<Vec<ArticleDraft>> {
        match &self.behavior {
            Behavior::Articles(drafts) => Ok(drafts.clone()),
            Behavior::Fail => Err(Error::Feed("unexpected end of document".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
        }
    }
}

fn mock(source: Source, behavior: Behavior) -> Arc<dyn Scraper> {
    Arc::new(MockScraper { source, behavior })
}

fn draft(source: Source, local: &str, title: &str, description: &str) -> ArticleDraft {
    ArticleDraft {
        id: source.article_id(local),
        title: title.to_string(),
        description: description.to_string(),
        uri: format!("https://example.com/{}/{}", source.slug(), local),
        source,
        published_at: Utc.with_ymd_and_hms(2025, 5, 8, 8, 0, 0).unwrap(),
        banner: None,
        category: vec![],
        language: Some(Language::German),
    }
}

fn five_unrelated(source: Source) -> Vec<ArticleDraft> {
    [
        ("Bahn kündigt neuen Fahrplan an", "Ab Dezember fahren mehr Fernzüge zwischen Hamburg und München."),
        ("Dax erreicht Rekordhoch", "Anleger setzen auf sinkende Zinsen der Europäischen Zentralbank."),
        ("Hitzewelle im Süden erwartet", "Meteorologen rechnen mit Temperaturen von mehr als 35 Grad."),
        ("Bundesliga: Bayern verliert Topspiel", "Der Rekordmeister unterliegt in Dortmund mit null zu zwei."),
        ("Neue Ausstellung im Pergamonmuseum", "Nach jahrelanger Sanierung öffnet der Nordflügel für Besucher."),
    ]
    .iter()
    .enumerate()
    .map(|(i, (title, description))| draft(source, &(i + 1).to_string(), title, description))
    .collect()
}

fn manager(
    storage: Arc<InMemoryStorage>,
    scrapers: Vec<Arc<dyn Scraper>>,
    metrics: Arc<InMemoryMetrics>,
) -> ScraperManager {
    let resolver = Arc::new(LinkResolver::new(
        storage,
        Arc::new(SimilarityScorer::default()),
        LinkConfig::default(),
    ));
    ScraperManager::with_scrapers(scrapers, Arc::new(WhatlangClassifier::new()), resolver)
        .with_metrics(metrics)
        .with_timeout(Duration::from_millis(200))
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_adapter() {
    let storage = Arc::new(InMemoryStorage::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let mgr = manager(
        storage.clone(),
        vec![
            mock(Source::Zeit, Behavior::Fail),
            mock(Source::Faz, Behavior::Articles(five_unrelated(Source::Faz))),
        ],
        metrics.clone(),
    );

    let report = mgr.run().await.unwrap();

    assert_eq!(report.scraped, 5);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].adapter, Source::Zeit);
    assert!(matches!(report.errors[0].error, Error::Feed(_)));
    assert_eq!(report.link.inserted, 5);
    assert_eq!(storage.load_all().await.unwrap().len(), 5);

    assert_eq!(metrics.get("scraper_errors", "zeit"), 1);
    assert_eq!(metrics.get("articles_scraped", "faz"), 5);
    assert_eq!(metrics.get("job_errors", "ingest"), 0);
}

#[tokio::test]
async fn test_every_adapter_failing_fails_the_cycle() {
    let storage = Arc::new(InMemoryStorage::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let mgr = manager(
        storage.clone(),
        vec![mock(Source::Zeit, Behavior::Fail), mock(Source::Taz, Behavior::Fail)],
        metrics.clone(),
    );

    match mgr.run().await {
        Err(Error::AllScrapersFailed(errors)) => {
            let sources: Vec<Source> = errors.iter().map(|e| e.adapter).collect();
            assert_eq!(sources, vec![Source::Zeit, Source::Taz]);
        }
        other => panic!("expected AllScrapersFailed, got {:?}", other.map(|r| r.scraped)),
    }

    assert!(storage.load_all().await.unwrap().is_empty());
    assert_eq!(metrics.get("job_errors", "ingest"), 1);
}

#[tokio::test]
async fn test_hanging_adapter_times_out() {
    let storage = Arc::new(InMemoryStorage::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let mgr = manager(
        storage,
        vec![
            mock(Source::Welt, Behavior::Hang),
            mock(Source::Taz, Behavior::Articles(five_unrelated(Source::Taz))),
        ],
        metrics.clone(),
    );

    let report = mgr.run().await.unwrap();

    assert_eq!(report.scraped, 5);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0].error, Error::Timeout { .. }));
    assert_eq!(metrics.get("scraper_errors", "welt"), 1);
}

#[tokio::test]
async fn test_similar_articles_across_sources_are_linked_once() {
    let storage = Arc::new(InMemoryStorage::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let scrapers = vec![
        mock(
            Source::Zeit,
            Behavior::Articles(vec![draft(
                Source::Zeit,
                "1",
                "Trump besucht Berlin",
                "Der US-Präsident trifft den Bundeskanzler im Kanzleramt.",
            )]),
        ),
        mock(
            Source::Welt,
            Behavior::Articles(vec![
                draft(
                    Source::Welt,
                    "1",
                    "Donald Trump in Berlin besucht",
                    "Der US-Präsident kommt zu Gesprächen mit dem Bundeskanzler.",
                ),
                draft(
                    Source::Welt,
                    "2",
                    "Neue Ausstellung im Pergamonmuseum",
                    "Nach jahrelanger Sanierung öffnet der Nordflügel für Besucher.",
                ),
            ]),
        ),
    ];
    let mgr = manager(storage.clone(), scrapers, metrics);

    let first = mgr.run().await.unwrap();
    assert_eq!(first.link.inserted, 3);
    assert_eq!(first.link.links, 1);

    let stored = storage.load_all().await.unwrap();
    let zeit = stored.iter().find(|a| a.id == "zeit-1").unwrap();
    assert_eq!(zeit.linked_to, vec!["welt-1".to_string()]);
    let museum = stored.iter().find(|a| a.id == "welt-2").unwrap();
    assert!(museum.linked_to.is_empty());

    // Same feed content again: nothing new is stored and no edge is duplicated.
    let second = mgr.run().await.unwrap();
    assert_eq!(second.link.inserted, 0);
    let stored = storage.load_all().await.unwrap();
    assert_eq!(stored.len(), 3);
    let zeit = stored.iter().find(|a| a.id == "zeit-1").unwrap();
    assert_eq!(zeit.linked_to, vec!["welt-1".to_string()]);
}
