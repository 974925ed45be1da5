use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Split text into words on the space character. Runs of spaces yield no empty words.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|word| !word.is_empty()).collect()
}

/// A word is valid when it holds no control characters (code points 0-31).
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// Words excluded from both indexing and querying.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// Build from a collection of words; empty strings are dropped.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(Error::InvalidWord(word.to_owned()));
            }
            set.insert(word.to_owned());
        }
        Ok(Self { words: set })
    }

    /// Build from a space-separated list such as `"and in on"`.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces_only() {
        assert_eq!(split_into_words("  cat  in the city "), vec!["cat", "in", "the", "city"]);
        assert_eq!(split_into_words("tab\tkept"), vec!["tab\tkept"]);
        assert!(split_into_words("   ").is_empty());
    }

    #[test]
    fn control_characters_are_invalid() {
        assert!(is_valid_word("cat"));
        assert!(is_valid_word("кот"));
        assert!(!is_valid_word("ca\u{12}t"));
        assert!(!is_valid_word("line\n"));
    }

    #[test]
    fn stop_words_dedupe_and_validate() {
        let stop = StopWords::new(["in", "the", "", "in"]).unwrap();
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("the"));
        assert!(!stop.contains(""));
        assert_eq!(
            StopWords::from_text("in th\u{1}e").unwrap_err(),
            Error::InvalidWord("th\u{1}e".into())
        );
    }
}
