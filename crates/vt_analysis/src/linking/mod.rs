use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};
use vt_core::{Article, ArticleStorage, Result};

use crate::config::LinkConfig;
use crate::similarity::SimilarityScorer;

/// Outcome of one link resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub new_articles: usize,
    pub links: usize,
    pub inserted: usize,
}

/// Finds similarity edges for newly ingested articles and persists the
/// articles and their edges.
pub struct LinkResolver {
    storage: Arc<dyn ArticleStorage>,
    scorer: Arc<SimilarityScorer>,
    config: LinkConfig,
}

impl LinkResolver {
    pub fn new(storage: Arc<dyn ArticleStorage>, scorer: Arc<SimilarityScorer>, config: LinkConfig) -> Self {
        Self { storage, scorer, config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Links `new_articles` against everything already persisted and against
    /// each other, then stores articles and edges.
    pub async fn resolve(&self, mut new_articles: Vec<Article>) -> Result<LinkReport> {
        if new_articles.is_empty() {
            return Ok(LinkReport::default());
        }

        let existing = self.storage.load_all().await?;
        let links = link_similar_articles(&self.scorer, self.config.threshold, &mut new_articles, &existing);
        debug!(links, existing = existing.len(), "similarity scan finished");

        let unique = collect_unique_articles(&new_articles, &existing);
        let inserted = self.storage.upsert_articles(&unique).await?;

        persist_links(self.storage.as_ref(), &new_articles).await?;

        info!(
            new_articles = new_articles.len(),
            links,
            inserted,
            "linked articles persisted"
        );

        Ok(LinkReport {
            new_articles: new_articles.len(),
            links,
            inserted,
        })
    }
}

/// Pairwise scan. Each new article is compared with every existing article and
/// with every new article after it in the batch. Matches are recorded on the
/// new article only. Returns the number of edges added.
pub fn link_similar_articles(
    scorer: &SimilarityScorer,
    threshold: f64,
    new_articles: &mut [Article],
    existing: &[Article],
) -> usize {
    let mut links = 0;

    for i in 0..new_articles.len() {
        for other in existing {
            if other.id != new_articles[i].id
                && scorer.is_similar(&new_articles[i], other, threshold)
                && new_articles[i].link_to(&other.id)
            {
                links += 1;
            }
        }

        for j in (i + 1)..new_articles.len() {
            let (head, tail) = new_articles.split_at_mut(j);
            let current = &mut head[i];
            let candidate = &tail[0];
            if current.id != candidate.id
                && scorer.is_similar(current, candidate, threshold)
                && current.link_to(&candidate.id)
            {
                links += 1;
            }
        }
    }

    links
}

/// New articles plus every article one of them links to, keyed by id.
/// Articles without an id are skipped. New articles win over existing copies.
pub fn collect_unique_articles(new_articles: &[Article], existing: &[Article]) -> Vec<Article> {
    let existing_by_id: BTreeMap<&str, &Article> =
        existing.iter().map(|a| (a.id.as_str(), a)).collect();
    let new_by_id: BTreeMap<&str, &Article> =
        new_articles.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut unique: BTreeMap<String, Article> = BTreeMap::new();
    for article in new_articles {
        if article.id.is_empty() {
            continue;
        }
        unique.insert(article.id.clone(), article.clone());
    }

    for article in new_articles {
        for target in &article.linked_to {
            if target.is_empty() || unique.contains_key(target) {
                continue;
            }
            let linked = new_by_id
                .get(target.as_str())
                .or_else(|| existing_by_id.get(target.as_str()));
            if let Some(linked) = linked {
                unique.insert(target.clone(), (*linked).clone());
            }
        }
    }

    unique.into_values().collect()
}

async fn persist_links(storage: &dyn ArticleStorage, articles: &[Article]) -> Result<()> {
    for article in articles {
        let targets: Vec<String> = article
            .linked_to
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        if article.id.is_empty() || targets.is_empty() {
            continue;
        }
        storage.append_links(&article.id, &targets).await?;
    }
    Ok(())
}
