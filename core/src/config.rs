//! Ranking and concurrency tuning.

/// Maximum number of documents returned by a top-documents query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
/// Relevance values closer than this are treated as equal when sorting.
pub const RELEVANCE_EPSILON: f64 = 1e-6;
/// Default number of lock shards in the parallel relevance accumulator.
pub const DEFAULT_ACCUMULATOR_SHARDS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub max_result_document_count: usize,
    pub relevance_epsilon: f64,
    /// Clamped to at least 1 when the accumulator is built.
    pub accumulator_shards: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_result_document_count: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
            accumulator_shards: DEFAULT_ACCUMULATOR_SHARDS,
        }
    }
}
