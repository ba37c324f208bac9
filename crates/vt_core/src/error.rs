use std::fmt;

use thiserror::Error;

use crate::types::Source;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed feed: {0}")]
    Feed(String),

    #[error("{source_name} timed out after {seconds}s")]
    Timeout { source_name: String, seconds: u64 },

    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("all scrapers failed: {}", AdapterErrors(.0))]
    AllScrapersFailed(Vec<AdapterError>),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// A failure of a single source adapter, tagged with the adapter that produced it.
#[derive(Debug)]
pub struct AdapterError {
    pub adapter: Source,
    pub error: Error,
}

impl AdapterError {
    pub fn new(adapter: Source, error: Error) -> Self {
        Self { adapter, error }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.adapter, self.error)
    }
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

struct AdapterErrors<'a>(&'a [AdapterError]);

impl fmt::Display for AdapterErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl Error {
    pub fn storage(err: impl fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }

    /// True for failures that belong to the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scrapers_failed_lists_each_adapter() {
        let err = Error::AllScrapersFailed(vec![
            AdapterError::new(Source::Zeit, Error::Feed("bad xml".to_string())),
            AdapterError::new(
                Source::Taz,
                Error::Timeout { source_name: "taz".to_string(), seconds: 30 },
            ),
        ]);
        assert_eq!(
            err.to_string(),
            "all scrapers failed: Zeit: Malformed feed: bad xml; TAZ: taz timed out after 30s"
        );
    }

    #[test]
    fn test_storage_helper() {
        let err = Error::storage("constraint violated");
        assert!(err.is_storage());
        assert_eq!(err.to_string(), "Storage error: constraint violated");
    }
}
