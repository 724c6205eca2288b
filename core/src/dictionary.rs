//! Append-only word interner.
//!
//! Every distinct word gets a [`WordId`] the first time it is seen. Entries are
//! never removed or moved, so an id handed out once resolves to the same text
//! for the lifetime of the dictionary, even after every document that used the
//! word has been removed from the index.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Handle of an interned word. Equal ids mean equal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(u32);

impl WordId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Id for the word stored at position `index`, if it fits in a `u32`.
    fn from_index(index: usize) -> Result<Self> {
        u32::try_from(index).map(WordId).map_err(|_| Error::OutOfRange {
            index,
            len: u32::MAX as usize,
        })
    }
}

#[derive(Debug, Default)]
pub struct Dictionary {
    ids: HashMap<Box<str>, WordId>,
    words: Vec<Box<str>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `word`, inserting it if this is the first occurrence.
    /// Fails with [`Error::OutOfRange`] once the `u32` id space is used up.
    pub fn intern(&mut self, word: &str) -> Result<WordId> {
        if let Some(&id) = self.ids.get(word) {
            return Ok(id);
        }
        let id = WordId::from_index(self.words.len())?;
        let text: Box<str> = word.into();
        self.words.push(text.clone());
        self.ids.insert(text, id);
        Ok(id)
    }

    /// Look a word up without inserting it.
    pub fn get(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    pub fn resolve(&self, id: WordId) -> &str {
        &self.words[id.index()]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
