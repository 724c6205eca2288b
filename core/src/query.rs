//! Query parsing.
//!
//! A query is a space separated list of words. `-word` excludes documents
//! containing `word`; every other word contributes to relevance. Stop words
//! are dropped from both groups.

use crate::error::{Error, Result};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'a> {
    pub data: &'a str,
    pub is_minus: bool,
    pub is_stop: bool,
}

/// Plus and minus words as ordered sets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: BTreeSet<&'a str>,
    pub minus_words: BTreeSet<&'a str>,
}

/// Plus and minus words as sorted, deduplicated vectors, for rayon iteration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortedQuery<'a> {
    pub plus_words: Vec<&'a str>,
    pub minus_words: Vec<&'a str>,
}

pub struct QueryParser<'s> {
    stop_words: &'s StopWords,
}

impl<'s> QueryParser<'s> {
    pub fn new(stop_words: &'s StopWords) -> Self {
        Self { stop_words }
    }

    pub fn parse_word<'a>(&self, token: &'a str) -> Result<QueryWord<'a>> {
        let (data, is_minus) = match token.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (token, false),
        };
        if data.is_empty() {
            return Err(Error::InvalidArgument(format!("empty minus word in query: {token:?}")));
        }
        if !is_valid_word(data) {
            return Err(Error::InvalidArgument(format!(
                "query word {token:?} contains control characters"
            )));
        }
        if is_minus && data.starts_with('-') {
            return Err(Error::InvalidArgument(format!("malformed minus word: {token:?}")));
        }
        Ok(QueryWord {
            data,
            is_minus,
            is_stop: self.stop_words.contains(data),
        })
    }

    pub fn parse<'a>(&self, text: &'a str) -> Result<Query<'a>> {
        let mut query = Query::default();
        for token in split_into_words(text) {
            let word = self.parse_word(token)?;
            if word.is_stop {
                continue;
            }
            if word.is_minus {
                query.minus_words.insert(word.data);
            } else {
                query.plus_words.insert(word.data);
            }
        }
        Ok(query)
    }

    pub fn parse_sorted<'a>(&self, text: &'a str) -> Result<SortedQuery<'a>> {
        let mut query = SortedQuery::default();
        for token in split_into_words(text) {
            let word = self.parse_word(token)?;
            if word.is_stop {
                continue;
            }
            if word.is_minus {
                query.minus_words.push(word.data);
            } else {
                query.plus_words.push(word.data);
            }
        }
        for words in [&mut query.plus_words, &mut query.minus_words] {
            words.sort_unstable();
            words.dedup();
        }
        Ok(query)
    }
}
