use vt_core::Language;

/// Title-cases keyword strings for a fixed locale.
///
/// Every word starts upper case and continues lower case. Word boundaries are
/// any non-alphanumeric character except the apostrophe, so `us-wahl` becomes
/// `Us-Wahl`. Turkish maps `i` to `İ`, Dutch capitalises a leading `ij` as a
/// unit.
#[derive(Debug, Clone, Copy)]
pub struct TitleCaser {
    locale: Language,
}

impl Default for TitleCaser {
    fn default() -> Self {
        Self::new(Language::German)
    }
}

impl TitleCaser {
    pub fn new(locale: Language) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Language {
        self.locale
    }

    pub fn format(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut at_word_start = true;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if !c.is_alphanumeric() {
                at_word_start = c != '\'';
                out.push(c);
                continue;
            }

            if at_word_start {
                self.push_upper(&mut out, c);
                if self.locale == Language::Dutch && (c == 'i' || c == 'I') {
                    if let Some(&next) = chars.peek() {
                        if next == 'j' || next == 'J' {
                            out.push('J');
                            chars.next();
                        }
                    }
                }
            } else {
                self.push_lower(&mut out, c);
            }
            at_word_start = false;
        }

        out
    }

    fn push_upper(&self, out: &mut String, c: char) {
        if self.locale == Language::Turkish && c == 'i' {
            out.push('İ');
        } else {
            out.extend(c.to_uppercase());
        }
    }

    fn push_lower(&self, out: &mut String, c: char) {
        if self.locale == Language::Turkish && c == 'I' {
            out.push('ı');
        } else {
            out.extend(c.to_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_german_title_case() {
        let caser = TitleCaser::default();
        assert_eq!(caser.format("bundestag"), "Bundestag");
        assert_eq!(caser.format("friedrich MERZ"), "Friedrich Merz");
        assert_eq!(caser.format("us-wahl"), "Us-Wahl");
        assert_eq!(caser.format("über grenzen"), "Über Grenzen");
        assert_eq!(caser.format("o'neill"), "O'neill");
    }

    #[test]
    fn test_locale_specific_rules() {
        assert_eq!(TitleCaser::new(Language::Turkish).format("istanbul"), "İstanbul");
        assert_eq!(TitleCaser::new(Language::Dutch).format("ijsselmeer"), "IJsselmeer");
        assert_eq!(TitleCaser::new(Language::German).format("ijsselmeer"), "Ijsselmeer");
    }
}
