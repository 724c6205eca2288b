use crate::dictionary::WordId;
use crate::server::SearchServer;
use crate::DocId;
use std::collections::HashSet;

/// Remove every document whose set of indexed words equals that of a document
/// with a lower id. Word order, repetitions and stop words do not matter.
/// Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let mut seen: HashSet<Vec<WordId>> = HashSet::new();
    let duplicates: Vec<DocId> = server
        .word_sets()
        .filter_map(|(id, words)| (!seen.insert(words)).then_some(id))
        .collect();

    for &id in &duplicates {
        tracing::info!(document_id = id, "found duplicate document");
        server.remove_document(id);
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStatus;

    #[test]
    fn keeps_lowest_id_of_each_group() {
        let mut server = SearchServer::new();
        for (id, text) in [(1, "a b"), (2, "a b"), (3, "b a"), (4, "a b c"), (5, "c b a a")] {
            server.add_document(id, text, DocumentStatus::Actual, &[]).unwrap();
        }
        assert_eq!(remove_duplicates(&mut server), vec![2, 3, 5]);
        assert_eq!(server.document_ids().collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn empty_word_sets_are_duplicates_of_each_other() {
        let mut server = SearchServer::with_stop_words("and with").unwrap();
        server.add_document(7, "and", DocumentStatus::Actual, &[]).unwrap();
        server.add_document(9, "with and", DocumentStatus::Banned, &[]).unwrap();
        assert_eq!(remove_duplicates(&mut server), vec![9]);
    }
}
