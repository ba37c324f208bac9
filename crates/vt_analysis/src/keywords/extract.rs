use std::collections::{BTreeMap, HashSet};

use vt_core::Article;

use crate::similarity::SimilarityScorer;
use crate::text::{normalize, tokenize, Stopwords};

/// Words that show up in every feed and never make a useful topic.
pub const BOILERPLATE: [&str; 5] = ["news", "article", "report", "says", "heute"];

const UNIGRAM_WEIGHT: u32 = 3;
const BIGRAM_WEIGHT: u32 = 5;
const MIN_TOKEN_CHARS: usize = 4;

pub fn is_boilerplate(word: &str) -> bool {
    BOILERPLATE.contains(&word)
}

/// Keeps the first article for every case and space normalized title.
pub fn dedup_by_title(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|article| seen.insert(normalize(&article.title)))
        .collect()
}

/// Greedy seed clustering. Each unvisited article becomes a seed and absorbs
/// every later unvisited article that is similar to the seed itself. Members
/// are not compared with each other. Singleton clusters are dropped.
pub fn cluster_articles<'a>(
    scorer: &SimilarityScorer,
    articles: &'a [Article],
    threshold: f64,
) -> Vec<Vec<&'a Article>> {
    let mut visited = vec![false; articles.len()];
    let mut clusters = Vec::new();

    for (i, seed) in articles.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut cluster = vec![seed];

        for (j, candidate) in articles.iter().enumerate().skip(i + 1) {
            if !visited[j] && scorer.is_similar(seed, candidate, threshold) {
                visited[j] = true;
                cluster.push(candidate);
            }
        }

        if cluster.len() > 1 {
            clusters.push(cluster);
        }
    }

    clusters
}

fn is_content_word(token: &str, stopwords: &Stopwords) -> bool {
    token.chars().count() >= MIN_TOKEN_CHARS && !stopwords.is_any_stopword(token) && !is_boilerplate(token)
}

/// Scores unigrams and adjacent bigrams over title and description of every
/// cluster member. A bigram counts whenever its second token is a content word.
pub fn extract_candidates(cluster: &[&Article], stopwords: &Stopwords) -> BTreeMap<String, u32> {
    let mut candidates = BTreeMap::new();

    for article in cluster {
        let tokens = tokenize(&format!("{} {}", article.title, article.description));

        for (i, token) in tokens.iter().enumerate() {
            if is_content_word(token, stopwords) {
                *candidates.entry(token.clone()).or_insert(0) += UNIGRAM_WEIGHT;
            }

            if let Some(next) = tokens.get(i + 1) {
                if is_content_word(next, stopwords) {
                    *candidates.entry(format!("{} {}", token, next)).or_insert(0) += BIGRAM_WEIGHT;
                }
            }
        }
    }

    candidates
}

/// Highest scores first, ties in ascending string order.
pub fn select_top(candidates: &BTreeMap<String, u32>, limit: usize) -> Vec<(String, u32)> {
    let mut ranked: Vec<(String, u32)> = candidates
        .iter()
        .map(|(keyword, score)| (keyword.clone(), *score))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
