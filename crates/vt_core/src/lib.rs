pub mod error;
pub mod language;
pub mod metrics;
pub mod storage;
pub mod types;

pub use error::{AdapterError, Error, Result};
pub use language::{Language, LanguageClassifier};
pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics};
pub use storage::{ArticleStorage, KeywordAssociation, KeywordRow, KeywordTransaction};
pub use types::{days_before, Article, ArticleDraft, KeyWords, Source};

pub mod prelude {
    pub use super::{Article, ArticleDraft, ArticleStorage, Error, Language, Result, Source};
}
