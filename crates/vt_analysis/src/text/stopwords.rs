use std::collections::HashSet;

use vt_core::Language;

const ENGLISH: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "have", "this", "but", "or",
    "not", "been", "were", "they", "their", "can", "had",
];

const GERMAN: &[&str] = &[
    "aber", "als", "am", "an", "auch", "auf", "aus", "bei", "bin", "bis", "bist", "da", "das",
    "dass", "dem", "den", "der", "des", "die", "dies", "diese", "diesem", "diesen", "dieser",
    "doch", "du", "durch", "ein", "eine", "einem", "einen", "einer", "eines", "er", "es", "für",
    "hab", "habe", "haben", "hat", "hatte", "hatten", "hier", "ich", "ihm", "ihn", "ihr", "im",
    "in", "ins", "ist", "ja", "kann", "machen", "mein", "mit", "nach", "nicht", "noch", "nur",
    "oder", "ohne", "sehr", "sein", "seine", "seinem", "seinen", "seiner", "sich", "sie", "sind",
    "so", "über", "um", "und", "uns", "von", "vor", "war", "waren", "warum", "was", "weil",
    "wenn", "wer", "wie", "wird", "wir", "wo", "wurde", "wurden", "zu", "zum", "zur",
];

/// Read-only stopword sets. Built once at start-up and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Stopwords {
    english: HashSet<&'static str>,
    german: HashSet<&'static str>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwords {
    pub fn new() -> Self {
        Self {
            english: ENGLISH.iter().copied().collect(),
            german: GERMAN.iter().copied().collect(),
        }
    }

    /// The set for `language`. Languages without a dedicated list use English.
    pub fn for_language(&self, language: Language) -> &HashSet<&'static str> {
        match language {
            Language::German => &self.german,
            _ => &self.english,
        }
    }

    pub fn is_stopword(&self, word: &str, language: Language) -> bool {
        self.for_language(language).contains(word)
    }

    /// Membership in any known list, used where text mixes languages.
    pub fn is_any_stopword(&self, word: &str) -> bool {
        self.english.contains(word) || self.german.contains(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_selection_falls_back_to_english() {
        let stopwords = Stopwords::new();
        assert!(stopwords.is_stopword("und", Language::German));
        assert!(!stopwords.is_stopword("und", Language::English));
        assert!(stopwords.is_stopword("the", Language::French));
        assert!(stopwords.is_stopword("the", Language::Unknown));
    }

    #[test]
    fn test_any_stopword_covers_both_lists() {
        let stopwords = Stopwords::new();
        assert!(stopwords.is_any_stopword("über"));
        assert!(stopwords.is_any_stopword("their"));
        assert!(!stopwords.is_any_stopword("kanzler"));
    }
}
