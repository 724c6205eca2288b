//! In-memory TF-IDF search server.
//!
//! Documents are indexed by word; queries support plus words, minus words
//! (`-word`) and stop-word filtering, and are answered with a short list of
//! documents ranked by relevance. Ranking, matching and removal can run either
//! sequentially or on the rayon thread pool, see [`ExecutionPolicy`].

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod query;
pub mod server;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use accumulator::ConcurrentMap;
pub use batch::{process_queries, process_queries_joined};
pub use config::SearchConfig;
pub use dedup::remove_duplicates;
pub use dictionary::{Dictionary, WordId};
pub use error::{Error, Result};
pub use server::SearchServer;

/// Document identifier. Negative values are rejected on insertion.
pub type DocId = i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl FromStr for DocumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "irrelevant" => Ok(Self::Irrelevant),
            "banned" => Ok(Self::Banned),
            "removed" => Ok(Self::Removed),
            other => Err(Error::InvalidArgument(format!("unknown document status: {other}"))),
        }
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self { id, relevance, rating }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Selects between the single-threaded path and the rayon-backed one.
/// Both produce the same documents; relevance may differ within epsilon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}
