use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Split text into words on the space character. Runs of spaces are collapsed;
/// every other character, punctuation and control characters included, stays
/// part of a word.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(' ').filter(|word| !word.is_empty())
}

/// A word is valid when it has no characters below U+0020.
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// Integer mean truncated toward zero; 0 for no ratings.
pub fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}

/// Words excluded from both indexing and querying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse space separated stop words.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_words(split_into_words(text))
    }

    /// Build from a collection. Empty strings are skipped, duplicates collapse.
    /// Nothing is kept if any word is invalid.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if !is_valid_word(word) {
                return Err(Error::InvalidArgument(format!(
                    "stop word {word:?} contains control characters"
                )));
            }
            if !word.is_empty() {
                set.insert(word.to_string());
            }
        }
        Ok(Self { words: set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces_only() {
        let words: Vec<&str> = split_into_words("  cat,  in the\tcity ").collect();
        assert_eq!(words, vec!["cat,", "in", "the\tcity"]);
    }

    #[test]
    fn control_characters_are_invalid() {
        assert!(is_valid_word("fluffy"));
        assert!(is_valid_word("пушистый-кот!"));
        assert!(!is_valid_word("tab\there"));
        assert!(!is_valid_word("bell\u{7}"));
    }

    #[test]
    fn average_rating_truncates_toward_zero() {
        assert_eq!(compute_average_rating(&[7, 2, 7]), 5);
        assert_eq!(compute_average_rating(&[-7, -2, -7]), -5);
        assert_eq!(compute_average_rating(&[]), 0);
        assert_eq!(compute_average_rating(&[i32::MAX, i32::MAX]), i32::MAX);
    }

    #[test]
    fn stop_words_are_deduplicated() {
        let stop = StopWords::from_text("and  in and on").unwrap();
        assert_eq!(stop.len(), 3);
        assert!(stop.contains("and"));
        assert!(!stop.contains("cat"));

        let stop = StopWords::from_words(["", "a", "a"]).unwrap();
        assert_eq!(stop.iter().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn invalid_stop_word_is_rejected() {
        let err = StopWords::from_words(["ok", "bad\u{1}"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
