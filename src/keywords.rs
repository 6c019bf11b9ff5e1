use std::collections::HashSet;
use std::sync::Arc;

/// Punctuation stripped from token edges by the normalized strategy.
const EDGE_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// Tokens this short (in chars) or shorter are dropped by the normalized strategy.
const MIN_KEYWORD_CHARS: usize = 4;

/// Normalized, deduplicated set of words extracted from a text.
pub type KeywordSet = HashSet<String>;

/// Tokenization strategy used to turn text into a [`KeywordSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizeStrategy {
    /// Lower-cased whitespace split, nothing stripped or filtered
    Raw,
    /// Lower-cased, edge punctuation stripped, short words dropped
    #[default]
    Normalized,
}

impl TokenizeStrategy {
    /// Creates a new extractor instance of this kind.
    #[must_use]
    pub fn create(self) -> Arc<dyn KeywordExtractor> {
        match self {
            Self::Raw => Arc::new(RawTokenizer),
            Self::Normalized => Arc::new(NormalizedTokenizer),
        }
    }

    /// Extracts keywords with this strategy.
    #[must_use]
    pub fn extract(self, text: &str) -> KeywordSet {
        match self {
            Self::Raw => RawTokenizer.extract(text),
            Self::Normalized => NormalizedTokenizer.extract(text),
        }
    }
}

/// Trait for turning text into a keyword set.
///
/// Implementations must be pure: the same text always yields the same set.
pub trait KeywordExtractor: Send + Sync {
    /// Extracts the keyword set of the given text.
    fn extract(&self, text: &str) -> KeywordSet;
}

/// Lower-cases and splits on whitespace. Punctuation stays attached.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawTokenizer;

impl KeywordExtractor for RawTokenizer {
    fn extract(&self, text: &str) -> KeywordSet {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}

/// Lower-cases, strips `. , ! ?` from token edges and keeps words longer
/// than four characters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NormalizedTokenizer;

impl KeywordExtractor for NormalizedTokenizer {
    fn extract(&self, text: &str) -> KeywordSet {
        text.to_lowercase()
            .split_whitespace()
            .map(strip_edge_punctuation)
            .filter(|word| word.chars().count() > MIN_KEYWORD_CHARS)
            .map(str::to_owned)
            .collect()
    }
}

#[inline]
fn strip_edge_punctuation(token: &str) -> &str {
    token.trim_matches(EDGE_PUNCTUATION.as_slice())
}

/// Extracts keywords using the normalized strategy.
///
/// # Examples
///
/// ```
/// use llm_assist::extract_keywords;
///
/// let keywords = extract_keywords("Machine learning, models!");
/// assert!(keywords.contains("machine"));
/// assert!(keywords.contains("models"));
/// ```
#[must_use]
pub fn extract_keywords(text: &str) -> KeywordSet {
    NormalizedTokenizer.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> KeywordSet {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_normalized_empty() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \n\t ").is_empty());
    }

    #[test]
    fn test_normalized_basic() {
        let keywords = extract_keywords("Machine learning models are great");
        assert_eq!(keywords, set(&["machine", "learning", "models", "great"]));
    }

    #[test]
    fn test_normalized_strips_edge_punctuation_only() {
        let keywords = extract_keywords("...Hello, world!? e.g.,example!! mid,dle?");
        assert!(keywords.contains("hello"));
        assert!(keywords.contains("world"));
        assert!(keywords.contains("e.g.,example"));
        assert!(keywords.contains("mid,dle"));
    }

    #[test]
    fn test_normalized_length_filter_after_stripping() {
        // "word!!!" strips to four chars and is dropped.
        let keywords = extract_keywords("word!!! words!!! tiny");
        assert_eq!(keywords, set(&["words"]));
    }

    #[test]
    fn test_normalized_keeps_other_punctuation() {
        let keywords = extract_keywords("(quoted) semi;colon");
        assert!(keywords.contains("(quoted)"));
        assert!(keywords.contains("semi;colon"));
    }

    #[test]
    fn test_normalized_counts_chars_not_bytes() {
        // Four chars, eight bytes.
        assert!(extract_keywords("ééée").is_empty());
        assert!(extract_keywords("ééééé").contains("ééééé"));
    }

    #[test]
    fn test_normalized_collapses_duplicates() {
        let keywords = extract_keywords("Rust rust RUST, rust. Rustacean");
        assert_eq!(keywords, set(&["rustacean"]));

        let keywords = extract_keywords("Tokio tokio, TOKIO!");
        assert_eq!(keywords, set(&["tokio"]));
    }

    #[test]
    fn test_normalized_invariants() {
        let text = "Hello!!! ,,,Wonderful... world? Interesting, really. ?!.,";
        for keyword in extract_keywords(text) {
            assert!(keyword.chars().count() > MIN_KEYWORD_CHARS);
            assert!(!keyword.starts_with(EDGE_PUNCTUATION.as_slice()));
            assert!(!keyword.ends_with(EDGE_PUNCTUATION.as_slice()));
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "The quick brown foxes jumped over lazy sleeping dogs.";
        assert_eq!(extract_keywords(text), extract_keywords(text));
        assert_eq!(
            TokenizeStrategy::Raw.extract(text),
            TokenizeStrategy::Raw.extract(text)
        );
    }

    #[test]
    fn test_raw_keeps_everything() {
        let keywords = TokenizeStrategy::Raw.extract("What is a Neuron? a neuron");
        assert_eq!(keywords, set(&["what", "is", "a", "neuron?", "neuron"]));
    }

    #[test]
    fn test_strategy_create_matches_extract() {
        let text = "Photosynthesis converts light, water and carbon dioxide.";
        for strategy in [TokenizeStrategy::Raw, TokenizeStrategy::Normalized] {
            assert_eq!(strategy.create().extract(text), strategy.extract(text));
        }
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(TokenizeStrategy::default(), TokenizeStrategy::Normalized);
    }
}
