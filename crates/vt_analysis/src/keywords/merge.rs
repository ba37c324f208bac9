use std::collections::{BTreeMap, BTreeSet};

use crate::text::{trim_non_alphanumeric, TitleCaser};

use super::extract::is_boilerplate;

/// A canonical keyword with the articles it covers across all clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCandidate {
    pub keyword: String,
    pub frequency: u32,
    pub articles: BTreeSet<String>,
}

impl KeywordCandidate {
    pub fn new(keyword: impl Into<String>, frequency: u32, articles: impl IntoIterator<Item = String>) -> Self {
        Self {
            keyword: keyword.into(),
            frequency,
            articles: articles.into_iter().collect(),
        }
    }
}

/// Trims, filters and title-cases a raw candidate. `None` when the result is
/// too short or boilerplate.
pub fn canonicalize(raw: &str, caser: &TitleCaser, min_len: usize) -> Option<String> {
    let cleaned = trim_non_alphanumeric(raw);
    if cleaned.chars().count() < min_len || is_boilerplate(&cleaned.to_lowercase()) {
        return None;
    }
    Some(caser.format(cleaned))
}

/// Keyword candidates keyed by canonical string. Identical strings coming from
/// different clusters union their article sets and sum their frequencies.
#[derive(Debug, Default)]
pub struct KeywordMerger {
    merged: BTreeMap<String, KeywordCandidate>,
}

impl KeywordMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, keyword: String, frequency: u32, articles: &BTreeSet<String>) {
        let entry = self
            .merged
            .entry(keyword.clone())
            .or_insert_with(|| KeywordCandidate::new(keyword, 0, Vec::new()));
        entry.frequency += frequency;
        entry.articles.extend(articles.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn into_candidates(self) -> Vec<KeywordCandidate> {
        self.merged.into_values().collect()
    }
}

/// Among keywords covering exactly the same article set, keeps the one with
/// the highest frequency, the smaller string on ties. Output is ordered by
/// keyword.
pub fn dedup_by_coverage(candidates: Vec<KeywordCandidate>) -> Vec<KeywordCandidate> {
    let mut by_coverage: BTreeMap<BTreeSet<String>, KeywordCandidate> = BTreeMap::new();

    for candidate in candidates {
        match by_coverage.get(&candidate.articles) {
            Some(best) if !outranks(&candidate, best) => {}
            _ => {
                by_coverage.insert(candidate.articles.clone(), candidate);
            }
        }
    }

    let mut survivors: Vec<KeywordCandidate> = by_coverage.into_values().collect();
    survivors.sort_by(|a, b| a.keyword.cmp(&b.keyword));
    survivors
}

fn outranks(candidate: &KeywordCandidate, best: &KeywordCandidate) -> bool {
    candidate.frequency > best.frequency
        || (candidate.frequency == best.frequency && candidate.keyword < best.keyword)
}

/// Walks keywords from the broadest article set down and keeps only those not
/// contained in an already kept set. Output keeps that walk order.
pub fn eliminate_redundant(mut candidates: Vec<KeywordCandidate>) -> Vec<KeywordCandidate> {
    candidates.sort_by(|a, b| {
        b.articles
            .len()
            .cmp(&a.articles.len())
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    let mut kept: Vec<KeywordCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().any(|k| candidate.articles.is_subset(&k.articles)) {
            continue;
        }
        kept.push(candidate);
    }
    kept
}
