use serde::{Deserialize, Serialize};

/// Weights and bucket values of the composite similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub title_weight: f64,
    pub desc_weight: f64,
    pub time_weight: f64,
    pub source_weight: f64,
    pub same_day_bonus: f64,
    pub same_week_bonus: f64,
    pub same_month_bonus: f64,
    pub same_source: f64,
    pub different_source: f64,
    pub min_title_length: usize,
    pub min_desc_length: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.45,
            desc_weight: 0.35,
            time_weight: 0.15,
            source_weight: 0.05,
            same_day_bonus: 1.0,
            same_week_bonus: 0.8,
            same_month_bonus: 0.5,
            same_source: 0.2,
            different_source: 0.3,
            min_title_length: 10,
            min_desc_length: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub threshold: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Trailing window of publish dates that is mined.
    pub window_days: i64,
    /// Seed similarity needed to join a cluster. Independent of the link threshold.
    pub cluster_threshold: f64,
    /// Candidates kept per cluster.
    pub top_k: usize,
    pub min_keyword_len: usize,
    pub keyword_batch_size: usize,
    pub association_batch_size: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            cluster_threshold: 0.36,
            top_k: 8,
            min_keyword_len: 4,
            keyword_batch_size: 100,
            association_batch_size: 500,
        }
    }
}
