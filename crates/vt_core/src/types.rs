use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::Error;

/// The fixed set of feeds the pipeline ingests from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Zeit,
    Faz,
    Tagesschau,
    Sueddeutsche,
    Welt,
    Handelsblatt,
    Taz,
}

impl Source {
    pub const ALL: [Source; 7] = [
        Source::Zeit,
        Source::Faz,
        Source::Tagesschau,
        Source::Sueddeutsche,
        Source::Welt,
        Source::Handelsblatt,
        Source::Taz,
    ];

    /// Stable slug, used as identity prefix, storage value and metric label.
    pub fn slug(&self) -> &'static str {
        match self {
            Source::Zeit => "zeit",
            Source::Faz => "faz",
            Source::Tagesschau => "tagesschau",
            Source::Sueddeutsche => "sueddeutsche",
            Source::Welt => "welt",
            Source::Handelsblatt => "handelsblatt",
            Source::Taz => "taz",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Source::Zeit => "Zeit",
            Source::Faz => "FAZ",
            Source::Tagesschau => "Tagesschau",
            Source::Sueddeutsche => "Süddeutsche",
            Source::Welt => "Welt",
            Source::Handelsblatt => "Handelsblatt",
            Source::Taz => "TAZ",
        }
    }

    /// Builds the `<source>-<local-id>` identity of an article from this feed.
    pub fn article_id(&self, local_id: &str) -> String {
        format!("{}-{}", self.slug(), local_id)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Source::ALL
            .into_iter()
            .find(|src| src.slug() == needle || src.name().to_lowercase() == needle)
            .ok_or_else(|| Error::Invalid(format!("unknown source: {}", s)))
    }
}

/// A canonical article as produced by a source adapter, before language
/// classification and linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub uri: String,
    pub source: Source,
    pub published_at: DateTime<Utc>,
    pub banner: Option<String>,
    pub category: Vec<String>,
    /// Set by adapters whose feed is known to be monolingual.
    pub language: Option<Language>,
}

impl ArticleDraft {
    pub fn into_article(self, language: Language) -> Article {
        Article {
            id: self.id,
            title: self.title,
            description: self.description,
            uri: self.uri,
            source: self.source,
            published_at: self.published_at,
            banner: self.banner,
            category: self.category,
            language,
            linked_to: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub uri: String,
    pub source: Source,
    pub published_at: DateTime<Utc>,
    pub banner: Option<String>,
    pub category: Vec<String>,
    pub language: Language,
    /// Ids of similar articles, in the direction discovered while scanning.
    #[serde(default)]
    pub linked_to: Vec<String>,
}

impl Article {
    /// Records a similarity edge. Self links and duplicates are ignored.
    pub fn link_to(&mut self, target_id: &str) -> bool {
        if target_id.is_empty() || target_id == self.id {
            return false;
        }
        if self.linked_to.iter().any(|id| id == target_id) {
            return false;
        }
        self.linked_to.push(target_id.to_string());
        true
    }
}

/// A mined topic tag and the articles it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyWords {
    pub id: String,
    pub keyword: String,
    pub last_update: DateTime<Utc>,
    pub articles: Vec<String>,
}

/// Start of a window reaching `days` back from `now`. Negative or
/// unrepresentable spans are rejected.
pub fn days_before(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, Error> {
    if days < 0 {
        return Err(Error::Invalid(format!("negative day count: {}", days)));
    }
    chrono::Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| Error::Invalid(format!("day count out of range: {}", days)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str) -> Article {
        ArticleDraft {
            id: id.to_string(),
            title: "Koalition einigt sich auf Haushalt".to_string(),
            description: "Nach langen Verhandlungen steht der Haushalt.".to_string(),
            uri: "https://example.com/a".to_string(),
            source: Source::Zeit,
            published_at: Utc::now(),
            banner: None,
            category: vec![],
            language: None,
        }
        .into_article(Language::German)
    }

    #[test]
    fn test_source_round_trips_through_slug_and_name() {
        for source in Source::ALL {
            assert_eq!(source.slug().parse::<Source>().unwrap(), source);
            assert_eq!(source.name().parse::<Source>().unwrap(), source);
        }
        assert!("bild".parse::<Source>().is_err());
    }

    #[test]
    fn test_article_id_format() {
        assert_eq!(Source::Tagesschau.article_id("abc-123"), "tagesschau-abc-123");
    }

    #[test]
    fn test_link_to_skips_self_and_duplicates() {
        let mut a = article("zeit-1");
        assert!(!a.link_to("zeit-1"));
        assert!(!a.link_to(""));
        assert!(a.link_to("faz-2"));
        assert!(!a.link_to("faz-2"));
        assert_eq!(a.linked_to, vec!["faz-2".to_string()]);
    }

    #[test]
    fn test_days_before_bounds() {
        let now = Utc::now();
        assert_eq!(days_before(now, 0).unwrap(), now);
        assert_eq!(days_before(now, 7).unwrap(), now - chrono::Duration::days(7));
        assert!(matches!(days_before(now, -1), Err(Error::Invalid(_))));
        assert!(matches!(days_before(now, 100_000_000), Err(Error::Invalid(_))));
        assert!(matches!(days_before(now, i64::MAX), Err(Error::Invalid(_))));
    }
}
