use crate::accumulator::ConcurrentMap;
use crate::config::SearchConfig;
use crate::dictionary::{Dictionary, WordId};
use crate::error::{Error, Result};
use crate::index::{InvertedIndex, Postings};
use crate::query::{Query, QueryParser, SortedQuery};
use crate::tokenizer::{compute_average_rating, is_valid_word, split_into_words, StopWords};
use crate::{DocId, Document, DocumentStatus, ExecutionPolicy};
use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap, HashSet};

#[derive(Debug, Clone)]
struct DocumentData {
    term_freqs: BTreeMap<WordId, f64>,
    rating: i32,
    status: DocumentStatus,
}

/// In-memory TF-IDF index over short documents.
///
/// Mutations (`add_document`, `set_stop_words`, `remove_document`) take
/// `&mut self`; ranking and matching take `&self` and may be called from many
/// threads at once.
#[derive(Debug, Default)]
pub struct SearchServer {
    config: SearchConfig,
    stop_words: StopWords,
    dictionary: Dictionary,
    index: InvertedIndex,
    documents: BTreeMap<DocId, DocumentData>,
    /// Ids of removed documents; they may not be added again.
    retired_ids: HashSet<DocId>,
}

impl SearchServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Server with space separated stop words.
    pub fn with_stop_words(stop_words: &str) -> Result<Self> {
        let mut server = Self::new();
        server.set_stop_words(stop_words)?;
        Ok(server)
    }

    /// Server with stop words taken from a collection.
    pub fn from_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut server = Self::new();
        server.set_stop_words_from(stop_words)?;
        Ok(server)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Replace the stop words. Documents already indexed keep their words.
    pub fn set_stop_words(&mut self, text: &str) -> Result<()> {
        self.stop_words = StopWords::from_text(text)?;
        tracing::debug!(stop_words = self.stop_words.len(), "stop words updated");
        Ok(())
    }

    pub fn set_stop_words_from<I, S>(&mut self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = StopWords::from_words(words)?;
        tracing::debug!(stop_words = self.stop_words.len(), "stop words updated");
        Ok(())
    }

    /// Index a document. The whole text is validated before anything is
    /// written, so a failed call leaves the server unchanged.
    pub fn add_document(
        &mut self,
        document_id: DocId,
        document: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(Error::InvalidArgument(format!("document id {document_id} is negative")));
        }
        if self.documents.contains_key(&document_id) {
            return Err(Error::InvalidArgument(format!("document {document_id} already exists")));
        }
        if self.retired_ids.contains(&document_id) {
            return Err(Error::InvalidArgument(format!(
                "document id {document_id} belonged to a removed document"
            )));
        }
        let words = self.split_into_words_no_stop(document)?;

        let inv_word_count = 1.0 / words.len() as f64;
        let mut term_freqs: BTreeMap<WordId, f64> = BTreeMap::new();
        for word in &words {
            let id = self.dictionary.intern(word)?;
            *term_freqs.entry(id).or_insert(0.0) += inv_word_count;
        }
        for (&word, &term_freq) in &term_freqs {
            self.index.insert(word, document_id, term_freq);
        }
        tracing::debug!(document_id, words = words.len(), unique_words = term_freqs.len(), "document added");

        self.documents.insert(
            document_id,
            DocumentData {
                term_freqs,
                rating: compute_average_rating(ratings),
                status,
            },
        );
        Ok(())
    }

    pub fn remove_document(&mut self, document_id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id);
    }

    /// Remove a document if present. Unknown ids are ignored.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocId) {
        let Some(data) = self.documents.remove(&document_id) else {
            return;
        };
        let words: Vec<WordId> = data.term_freqs.into_keys().collect();
        self.index.remove_document(document_id, &words, policy);
        self.retired_ids.insert(document_id);
        tracing::debug!(document_id, words = words.len(), ?policy, "document removed");
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> DocumentIds<'_> {
        DocumentIds {
            inner: self.documents.keys(),
        }
    }

    /// The `index`-th live id in ascending order.
    pub fn document_id_at(&self, index: usize) -> Result<DocId> {
        self.documents.keys().nth(index).copied().ok_or(Error::OutOfRange {
            index,
            len: self.documents.len(),
        })
    }

    /// Term frequencies of a document, keyed by word.
    pub fn word_frequencies(&self, document_id: DocId) -> Result<BTreeMap<&str, f64>> {
        let data = self.documents.get(&document_id).ok_or(Error::NotFound(document_id))?;
        Ok(data
            .term_freqs
            .iter()
            .map(|(&word, &freq)| (self.dictionary.resolve(word), freq))
            .collect())
    }

    /// `ln(N / df)` for a word, or `None` if no live document contains it.
    pub fn inverse_document_freq(&self, word: &str) -> Option<f64> {
        let postings = self.dictionary.get(word).and_then(|id| self.index.documents(id))?;
        Some(self.idf(postings))
    }

    /// Top documents with status [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_by(raw_query, move |_, document_status, _| document_status == status)
    }

    pub fn find_top_documents_by<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, predicate)
    }

    /// Rank documents accepted by `predicate(id, status, rating)`.
    ///
    /// Results are ordered by relevance descending; documents whose relevance
    /// is within `relevance_epsilon` of the leading document of their group
    /// are ordered by rating descending. At most `max_result_document_count`
    /// documents are returned.
    pub fn find_top_documents_with<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let parser = QueryParser::new(&self.stop_words);
        let mut matched = match policy {
            ExecutionPolicy::Sequential => self.find_all_documents(&parser.parse(raw_query)?, &predicate),
            ExecutionPolicy::Parallel => {
                self.find_all_documents_par(&parser.parse_sorted(raw_query)?, &predicate)
            }
        };
        sort_by_relevance(&mut matched, self.config.relevance_epsilon);
        matched.truncate(self.config.max_result_document_count);
        Ok(matched)
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Plus words of the query found in the document, sorted, together with
    /// the document status. The word list is empty if any minus word matches.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let status = self
            .documents
            .get(&document_id)
            .ok_or(Error::NotFound(document_id))?
            .status;
        let parser = QueryParser::new(&self.stop_words);
        let in_document = |word: &str| {
            self.dictionary
                .get(word)
                .filter(|&id| self.index.contains(id, document_id))
                .map(|id| self.dictionary.resolve(id))
        };

        let matched = match policy {
            ExecutionPolicy::Sequential => {
                let query = parser.parse(raw_query)?;
                if query.minus_words.iter().any(|word| in_document(*word).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.iter().filter_map(|word| in_document(*word)).collect()
                }
            }
            ExecutionPolicy::Parallel => {
                let query = parser.parse_sorted(raw_query)?;
                if query.minus_words.par_iter().any(|word| in_document(*word).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.par_iter().filter_map(|word| in_document(*word)).collect()
                }
            }
        };
        Ok((matched, status))
    }

    /// Word sets of all live documents in ascending id order.
    pub(crate) fn word_sets(&self) -> impl Iterator<Item = (DocId, Vec<WordId>)> + '_ {
        self.documents
            .iter()
            .map(|(&id, data)| (id, data.term_freqs.keys().copied().collect()))
    }

    fn split_into_words_no_stop<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(Error::InvalidArgument(format!(
                    "document word {word:?} contains control characters"
                )));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    fn idf(&self, postings: &Postings) -> f64 {
        (self.documents.len() as f64 / postings.len() as f64).ln()
    }

    fn passes<P>(&self, document_id: DocId, predicate: &P) -> bool
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        self.documents
            .get(&document_id)
            .is_some_and(|data| predicate(document_id, data.status, data.rating))
    }

    /// Postings of an indexed query word together with its IDF.
    fn weighted_postings(&self, word: &str) -> Option<(&Postings, f64)> {
        let postings = self.dictionary.get(word).and_then(|id| self.index.documents(id))?;
        Some((postings, self.idf(postings)))
    }

    fn find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for (postings, idf) in query.plus_words.iter().filter_map(|w| self.weighted_postings(w)) {
            for (&document_id, &term_freq) in postings {
                if self.passes(document_id, predicate) {
                    *relevance.entry(document_id).or_insert(0.0) += term_freq * idf;
                }
            }
        }
        for (postings, _) in query.minus_words.iter().filter_map(|w| self.weighted_postings(w)) {
            for document_id in postings.keys() {
                relevance.remove(document_id);
            }
        }
        self.collect_documents(relevance)
    }

    fn find_all_documents_par<P>(&self, query: &SortedQuery<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let relevance: ConcurrentMap<f64> = ConcurrentMap::new(self.config.accumulator_shards);
        query
            .plus_words
            .par_iter()
            .filter_map(|w| self.weighted_postings(w))
            .for_each(|(postings, idf)| {
                postings.par_iter().for_each(|(&document_id, &term_freq)| {
                    if self.passes(document_id, predicate) {
                        *relevance.accumulate(document_id) += term_freq * idf;
                    }
                });
            });
        // Every plus-word task has joined; erasing before this point could be
        // undone by a late accumulate.
        query
            .minus_words
            .par_iter()
            .filter_map(|w| self.weighted_postings(w))
            .for_each(|(postings, _)| {
                for &document_id in postings.keys() {
                    relevance.erase(document_id);
                }
            });
        self.collect_documents(relevance.build_ordinary_map())
    }

    fn collect_documents(&self, relevance: BTreeMap<DocId, f64>) -> Vec<Document> {
        relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                let data = self.documents.get(&id)?;
                Some(Document::new(id, relevance, data.rating))
            })
            .collect()
    }
}

/// Sort by relevance descending, then reorder each run of documents lying
/// within `epsilon` of the run's first document by rating descending.
fn sort_by_relevance(documents: &mut [Document], epsilon: f64) {
    documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    let mut start = 0;
    while start < documents.len() {
        let top = documents[start].relevance;
        let end = documents[start + 1..]
            .iter()
            .position(|d| top - d.relevance >= epsilon)
            .map_or(documents.len(), |offset| start + 1 + offset);
        documents[start..end].sort_by(|a, b| b.rating.cmp(&a.rating));
        start = end;
    }
}

/// Iterator over live document ids, ascending.
pub struct DocumentIds<'a> {
    inner: btree_map::Keys<'a, DocId, DocumentData>,
}

impl Iterator for DocumentIds<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for DocumentIds<'_> {
    fn next_back(&mut self) -> Option<DocId> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for DocumentIds<'_> {}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> DocumentIds<'a> {
        self.document_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, relevance: f64, rating: i32) -> Document {
        Document::new(id, relevance, rating)
    }

    #[test]
    fn near_equal_relevance_falls_back_to_rating() {
        let mut docs = vec![doc(1, 0.5, 1), doc(2, 0.9, 0), doc(3, 0.5 + 1e-8, 7), doc(4, 0.1, 9)];
        sort_by_relevance(&mut docs, 1e-6);
        let ids: Vec<DocId> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn zero_epsilon_sorts_by_relevance_only() {
        let mut docs = vec![doc(1, 0.5, 1), doc(2, 0.5, 3)];
        sort_by_relevance(&mut docs, 0.0);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn term_frequencies_sum_to_one() {
        let mut server = SearchServer::with_stop_words("and").unwrap();
        server
            .add_document(3, "cat and dog and cat bird", DocumentStatus::Actual, &[])
            .unwrap();
        let freqs = server.word_frequencies(3).unwrap();
        assert_eq!(freqs.keys().copied().collect::<Vec<_>>(), vec!["bird", "cat", "dog"]);
        assert!((freqs["cat"] - 0.5).abs() < 1e-12);
        assert!((freqs.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn failed_add_leaves_no_trace() {
        let mut server = SearchServer::new();
        let err = server
            .add_document(1, "fine words then bad\u{2}", DocumentStatus::Actual, &[1])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(server.document_count(), 0);
        assert!(server.dictionary.is_empty());
        server.add_document(1, "fine words", DocumentStatus::Actual, &[1]).unwrap();
        assert_eq!(server.document_count(), 1);
    }

    #[test]
    fn idf_is_log_of_document_ratio() {
        let mut server = SearchServer::new();
        server.add_document(0, "cat dog", DocumentStatus::Actual, &[]).unwrap();
        server.add_document(1, "cat", DocumentStatus::Actual, &[]).unwrap();
        assert_eq!(server.inverse_document_freq("cat"), Some(0.0));
        assert!((server.inverse_document_freq("dog").unwrap() - 2f64.ln()).abs() < 1e-12);
        assert_eq!(server.inverse_document_freq("bird"), None);
    }

    #[test]
    fn removed_words_stay_interned() {
        let mut server = SearchServer::new();
        server.add_document(0, "lonely", DocumentStatus::Actual, &[]).unwrap();
        server.remove_document(0);
        assert!(server.dictionary.get("lonely").is_some());
        assert_eq!(server.inverse_document_freq("lonely"), None);
        assert!(server.find_top_documents("lonely").unwrap().is_empty());
    }
}
