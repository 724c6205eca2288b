use crate::dictionary::WordId;
use crate::{DocId, ExecutionPolicy};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Term frequencies of one word, keyed by document id.
pub type Postings = BTreeMap<DocId, f64>;

/// Word → (document → term frequency).
///
/// Entries are addressed by [`WordId`] and live in a dense vector that grows
/// with the dictionary. A word whose documents were all removed keeps an empty
/// entry; lookups report it as absent.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: Vec<Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: WordId, doc_id: DocId, term_freq: f64) {
        let idx = word.index();
        if idx >= self.postings.len() {
            self.postings.resize_with(idx + 1, Postings::new);
        }
        self.postings[idx].insert(doc_id, term_freq);
    }

    /// Postings of `word`, or `None` if no live document contains it.
    pub fn documents(&self, word: WordId) -> Option<&Postings> {
        self.postings.get(word.index()).filter(|p| !p.is_empty())
    }

    /// Number of live documents containing `word`.
    pub fn document_frequency(&self, word: WordId) -> usize {
        self.documents(word).map_or(0, Postings::len)
    }

    pub fn contains(&self, word: WordId, doc_id: DocId) -> bool {
        self.documents(word).is_some_and(|p| p.contains_key(&doc_id))
    }

    /// Erase `doc_id` from the entries of `words`.
    ///
    /// `words` must be sorted and free of duplicates; a document's term map
    /// keys satisfy this. Under [`ExecutionPolicy::Parallel`] each entry is a
    /// separate task, which is sound because the entries are disjoint.
    pub fn remove_document(&mut self, doc_id: DocId, words: &[WordId], policy: ExecutionPolicy) {
        match policy {
            ExecutionPolicy::Sequential => {
                for word in words {
                    if let Some(postings) = self.postings.get_mut(word.index()) {
                        postings.remove(&doc_id);
                    }
                }
            }
            ExecutionPolicy::Parallel => {
                disjoint_entries_mut(&mut self.postings, words)
                    .into_par_iter()
                    .for_each(|postings| {
                        postings.remove(&doc_id);
                    });
            }
        }
    }
}

/// Split `slice` into mutable references to the entries at `sorted_ids`.
/// Ids past the end of the slice are skipped.
fn disjoint_entries_mut<'a, T>(slice: &'a mut [T], sorted_ids: &[WordId]) -> Vec<&'a mut T> {
    debug_assert!(sorted_ids.windows(2).all(|w| w[0] < w[1]));
    let mut entries = Vec::with_capacity(sorted_ids.len());
    let mut rest = slice;
    let mut offset = 0;
    for id in sorted_ids {
        let idx = id.index();
        if idx >= offset + rest.len() {
            break;
        }
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(idx - offset + 1);
        if let Some(entry) = head.last_mut() {
            entries.push(entry);
        }
        rest = tail;
        offset = idx + 1;
    }
    entries
}
