pub mod case;
pub mod stopwords;

pub use case::TitleCaser;
pub use stopwords::Stopwords;

/// Lower-cases and trims, the normal form used for comparisons.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Strips leading and trailing characters that are neither letters nor digits.
pub fn trim_non_alphanumeric(text: &str) -> &str {
    text.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Splits on whitespace after lower-casing and strips punctuation from token
/// edges. Tokens that are empty after stripping are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(trim_non_alphanumeric)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
