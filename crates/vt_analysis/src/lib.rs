pub mod config;
pub mod keywords;
pub mod language;
pub mod linking;
pub mod similarity;
pub mod text;

pub use config::{KeywordConfig, LinkConfig, SimilarityConfig};
pub use keywords::{KeywordCandidate, KeywordMiner, MiningReport};
pub use language::WhatlangClassifier;
pub use linking::{LinkReport, LinkResolver};
pub use similarity::SimilarityScorer;
pub use text::{Stopwords, TitleCaser};

pub mod prelude {
    pub use super::{
        KeywordConfig, KeywordMiner, LinkConfig, LinkResolver, SimilarityConfig, SimilarityScorer,
        Stopwords, WhatlangClassifier,
    };
}
