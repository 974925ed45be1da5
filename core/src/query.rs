use crate::error::{Error, Result};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};

/// A parsed query. Both word lists are sorted and free of duplicates and stop words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus_words: Vec<&'q str>,
    pub minus_words: Vec<&'q str>,
}

struct QueryWord<'q> {
    data: &'q str,
    is_minus: bool,
    is_stop: bool,
}

fn parse_query_word<'q>(word: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    let (data, is_minus) = match word.strip_prefix('-') {
        Some(rest) if rest.is_empty() || rest.starts_with('-') => {
            return Err(Error::InvalidMinusWord(word.to_owned()));
        }
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if !is_valid_word(data) {
        return Err(Error::InvalidWord(word.to_owned()));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.contains(data) })
}

impl<'q> Query<'q> {
    /// Parse a raw query into plus and minus words. No partial query is produced on error.
    pub fn parse(text: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Query::default();
        for word in split_into_words(text) {
            let query_word = parse_query_word(word, stop_words)?;
            if query_word.is_stop {
                continue;
            }
            if query_word.is_minus {
                query.minus_words.push(query_word.data);
            } else {
                query.plus_words.push(query_word.data);
            }
        }
        for words in [&mut query.plus_words, &mut query.minus_words] {
            words.sort_unstable();
            words.dedup();
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(text: &str) -> StopWords {
        StopWords::from_text(text).unwrap()
    }

    #[test]
    fn splits_plus_and_minus_words() {
        let q = Query::parse("fluffy -collar cat fluffy -collar", &stop("")).unwrap();
        assert_eq!(q.plus_words, vec!["cat", "fluffy"]);
        assert_eq!(q.minus_words, vec!["collar"]);
    }

    #[test]
    fn word_order_does_not_matter() {
        let stop = stop("and");
        assert_eq!(
            Query::parse("b a -c", &stop).unwrap(),
            Query::parse("-c a b a", &stop).unwrap()
        );
    }

    #[test]
    fn stop_words_are_dropped_even_when_negated() {
        let q = Query::parse("cat and -and", &stop("and")).unwrap();
        assert_eq!(q.plus_words, vec!["cat"]);
        assert!(q.minus_words.is_empty());
    }

    #[test]
    fn malformed_minus_words_are_rejected() {
        let stop = stop("");
        assert_eq!(Query::parse("cat -", &stop).unwrap_err(), Error::InvalidMinusWord("-".into()));
        assert_eq!(
            Query::parse("cat --dog", &stop).unwrap_err(),
            Error::InvalidMinusWord("--dog".into())
        );
    }

    #[test]
    fn control_characters_are_rejected() {
        let stop = stop("");
        assert!(matches!(Query::parse("ca\u{2}t", &stop), Err(Error::InvalidWord(_))));
        assert!(matches!(Query::parse("-d\u{1f}og", &stop), Err(Error::InvalidWord(_))));
    }

    #[test]
    fn empty_query_parses_to_nothing() {
        assert_eq!(Query::parse("   ", &stop("")).unwrap(), Query::default());
    }
}
