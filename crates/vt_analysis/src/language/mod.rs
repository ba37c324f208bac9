use std::fmt;

use vt_core::{Language, LanguageClassifier};
use whatlang::{Detector, Lang};

/// Trigram-based classifier restricted to the languages the pipeline stores.
pub struct WhatlangClassifier {
    detector: Detector,
}

impl fmt::Debug for WhatlangClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatlangClassifier").finish()
    }
}

impl Default for WhatlangClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangClassifier {
    pub fn new() -> Self {
        let allowlist = Language::DETECTABLE.iter().filter_map(|l| to_whatlang(*l)).collect();
        Self {
            detector: Detector::with_allowlist(allowlist),
        }
    }
}

impl LanguageClassifier for WhatlangClassifier {
    fn classify(&self, text: &str) -> Option<Language> {
        if text.trim().is_empty() {
            return None;
        }
        self.detector.detect(text).and_then(|info| from_whatlang(info.lang()))
    }
}

fn to_whatlang(language: Language) -> Option<Lang> {
    match language {
        Language::English => Some(Lang::Eng),
        Language::German => Some(Lang::Deu),
        Language::French => Some(Lang::Fra),
        Language::Spanish => Some(Lang::Spa),
        Language::Italian => Some(Lang::Ita),
        Language::Portuguese => Some(Lang::Por),
        Language::Dutch => Some(Lang::Nld),
        Language::Polish => Some(Lang::Pol),
        Language::Russian => Some(Lang::Rus),
        Language::Turkish => Some(Lang::Tur),
        Language::Chinese => Some(Lang::Cmn),
        Language::Japanese => Some(Lang::Jpn),
        Language::Arabic => Some(Lang::Ara),
        Language::Unknown => None,
    }
}

fn from_whatlang(lang: Lang) -> Option<Language> {
    Language::DETECTABLE
        .into_iter()
        .find(|candidate| to_whatlang(*candidate) == Some(lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_german_and_english() {
        let classifier = WhatlangClassifier::new();
        assert_eq!(
            classifier.classify(
                "Die Bundesregierung hat sich nach langen Verhandlungen auf einen neuen Haushalt \
                 für das kommende Jahr geeinigt, teilte ein Sprecher am Mittwoch mit."
            ),
            Some(Language::German)
        );
        assert_eq!(
            classifier.classify(
                "The government has agreed on a new budget for the coming year after long \
                 negotiations, a spokesperson said on Wednesday."
            ),
            Some(Language::English)
        );
    }

    #[test]
    fn test_blank_text_is_undetermined() {
        let classifier = WhatlangClassifier::new();
        assert_eq!(classifier.classify("   "), None);
        assert_eq!(classifier.classify_or_unknown(""), Language::Unknown);
    }
}
