use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vt_analysis::{KeywordConfig, LinkConfig, SimilarityConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Per request timeout of the shared feed client.
    pub timeout_secs: u64,
    /// Upper bound for a whole adapter fetch.
    pub adapter_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            adapter_timeout_secs: 45,
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs.max(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub ingest_interval_secs: u64,
    pub maintenance_interval_secs: u64,
    pub retention_days: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ingest_interval_secs: 15 * 60,
            maintenance_interval_secs: 24 * 60 * 60,
            retention_days: 7,
        }
    }
}

/// Everything tunable about the pipeline. Missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub similarity: SimilarityConfig,
    pub link: LinkConfig,
    pub keywords: KeywordConfig,
    pub scraper: ScraperConfig,
    pub schedule: ScheduleConfig,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.link.threshold, 0.3);
        assert_eq!(config.similarity.title_weight, 0.45);
        assert_eq!(config.keywords.cluster_threshold, 0.36);
        assert_eq!(config.scraper.timeout(), Duration::from_secs(30));
        assert_eq!(config.schedule.ingest_interval_secs, 900);
        assert_eq!(config.schedule.retention_days, 7);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"link": {{"threshold": 0.4}}, "keywords": {{"top_k": 5}}}}"#).unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.link.threshold, 0.4);
        assert_eq!(config.keywords.top_k, 5);
        assert_eq!(config.keywords.window_days, 14);
        assert_eq!(config.scraper, ScraperConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
        assert!(PipelineConfig::load(Path::new("/nonexistent/veritas.json")).is_err());
    }

    #[test]
    fn test_adapter_timeout_never_below_request_timeout() {
        let config = ScraperConfig { timeout_secs: 60, adapter_timeout_secs: 10 };
        assert_eq!(config.adapter_timeout(), Duration::from_secs(60));
    }
}
