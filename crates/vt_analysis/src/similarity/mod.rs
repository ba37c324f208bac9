use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use vt_core::{Article, Language, Source};

use crate::config::SimilarityConfig;
use crate::text::{normalize, Stopwords};

const HOURS_PER_DAY: f64 = 24.0;

/// Composite fuzzy similarity over title, description, publish time and source.
///
/// `score(a, b) == score(b, a)` for every pair: the stopword list applied to a
/// pair is chosen from both articles' languages.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    config: SimilarityConfig,
    stopwords: Arc<Stopwords>,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(SimilarityConfig::default(), Arc::new(Stopwords::new()))
    }
}

impl SimilarityScorer {
    pub fn new(config: SimilarityConfig, stopwords: Arc<Stopwords>) -> Self {
        Self { config, stopwords }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    pub fn score(&self, a: &Article, b: &Article) -> f64 {
        let languages = (a.language, b.language);
        let title = self.text_similarity(&a.title, &b.title, languages, self.config.min_title_length);
        let desc = self.text_similarity(
            &a.description,
            &b.description,
            languages,
            self.config.min_desc_length,
        );
        let time = self.time_similarity(a.published_at, b.published_at);
        let source = self.source_similarity(a.source, b.source);

        title * self.config.title_weight
            + desc * self.config.desc_weight
            + time * self.config.time_weight
            + source * self.config.source_weight
    }

    pub fn is_similar(&self, a: &Article, b: &Article, threshold: f64) -> bool {
        self.score(a, b) >= threshold
    }

    /// Blend of normalized edit distance and stopword-filtered token overlap.
    pub fn text_similarity(
        &self,
        s1: &str,
        s2: &str,
        languages: (Language, Language),
        min_length: usize,
    ) -> f64 {
        let s1 = normalize(s1);
        let s2 = normalize(s2);

        if s1 == s2 {
            return 1.0;
        }

        let len1 = s1.chars().count();
        let len2 = s2.chars().count();
        if len1 < min_length || len2 < min_length {
            return 0.0;
        }

        let distance = strsim::levenshtein(&s1, &s2);
        let lev_sim = 1.0 - distance as f64 / len1.max(len2) as f64;

        let tokens1 = self.filtered_tokens(&s1, languages);
        let tokens2 = self.filtered_tokens(&s2, languages);
        if tokens1.is_empty() || tokens2.is_empty() {
            return lev_sim * 0.5;
        }

        let intersection = tokens1.intersection(&tokens2).count();
        let union = tokens1.len() + tokens2.len() - intersection;
        let jaccard = if union > 0 {
            intersection as f64 / union as f64
        } else {
            0.0
        };

        lev_sim * 0.4 + jaccard * 0.6
    }

    fn filtered_tokens<'a>(&self, text: &'a str, languages: (Language, Language)) -> HashSet<&'a str> {
        text.split_whitespace()
            .filter(|token| token.chars().count() > 2)
            .filter(|token| {
                !self.stopwords.is_stopword(token, languages.0)
                    && !self.stopwords.is_stopword(token, languages.1)
            })
            .collect()
    }

    /// Bucketed by the absolute publish time difference. Past the month bucket
    /// the score decays linearly over a year, never exceeding the month value.
    pub fn time_similarity(&self, t1: DateTime<Utc>, t2: DateTime<Utc>) -> f64 {
        let hours = (t1 - t2).num_milliseconds().unsigned_abs() as f64 / 3_600_000.0;

        if hours < HOURS_PER_DAY {
            return self.config.same_day_bonus;
        }
        if hours < HOURS_PER_DAY * 7.0 {
            return self.config.same_week_bonus;
        }
        if hours < HOURS_PER_DAY * 30.0 {
            return self.config.same_month_bonus;
        }

        let days = hours / HOURS_PER_DAY;
        (1.0 - days / 365.0).max(0.0).min(self.config.same_month_bonus)
    }

    pub fn source_similarity(&self, s1: Source, s2: Source) -> f64 {
        if s1 == s2 {
            self.config.same_source
        } else {
            self.config.different_source
        }
    }
}
