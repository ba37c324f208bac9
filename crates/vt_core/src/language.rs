use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    Portuguese,
    Dutch,
    Polish,
    Russian,
    Turkish,
    Chinese,
    Japanese,
    Arabic,
    #[default]
    Unknown,
}

impl Language {
    pub const DETECTABLE: [Language; 13] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Portuguese,
        Language::Dutch,
        Language::Polish,
        Language::Russian,
        Language::Turkish,
        Language::Chinese,
        Language::Japanese,
        Language::Arabic,
    ];

    /// Storage code, e.g. `DE`.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::German => "DE",
            Language::French => "FR",
            Language::Spanish => "ES",
            Language::Italian => "IT",
            Language::Portuguese => "PT",
            Language::Dutch => "NL",
            Language::Polish => "PL",
            Language::Russian => "RU",
            Language::Turkish => "TR",
            Language::Chinese => "ZH",
            Language::Japanese => "JA",
            Language::Arabic => "AR",
            Language::Unknown => "UNKNOWN",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::German => "german",
            Language::French => "french",
            Language::Spanish => "spanish",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
            Language::Dutch => "dutch",
            Language::Polish => "polish",
            Language::Russian => "russian",
            Language::Turkish => "turkish",
            Language::Chinese => "chinese",
            Language::Japanese => "japanese",
            Language::Arabic => "arabic",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    /// Accepts codes or English names, case-insensitively. Empty means unknown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if needle.is_empty() || needle == "unknown" {
            return Ok(Language::Unknown);
        }
        Language::DETECTABLE
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(&needle) || lang.name() == needle)
            .ok_or_else(|| Error::Invalid(format!("unknown language: {}", s)))
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(Language::Unknown),
            Some(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Maps text to a language. Returning `None` means the language could not be
/// determined; callers record that as [`Language::Unknown`].
pub trait LanguageClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Language>;

    fn classify_or_unknown(&self, text: &str) -> Language {
        self.classify(text).unwrap_or(Language::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::German);
        assert_eq!("German".parse::<Language>().unwrap(), Language::German);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!("".parse::<Language>().unwrap(), Language::Unknown);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Japanese).unwrap();
        assert_eq!(json, "\"JA\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::Japanese);
        let missing: Language = serde_json::from_str("null").unwrap();
        assert_eq!(missing, Language::Unknown);
    }

    struct Never;

    impl LanguageClassifier for Never {
        fn classify(&self, _text: &str) -> Option<Language> {
            None
        }
    }

    #[test]
    fn test_undetermined_maps_to_unknown() {
        assert_eq!(Never.classify_or_unknown("irgendwas"), Language::Unknown);
    }
}
