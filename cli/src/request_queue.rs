//! Statistics over the most recent search requests.
//!
//! Every request advances a logical clock by one tick. Only the last
//! [`WINDOW`] requests are kept, and the queue counts how many of those came
//! back empty.

use search_core::{DocId, Document, DocumentStatus, ExecutionPolicy, SearchServer};
use std::collections::VecDeque;

/// Number of requests kept: one per minute of a day.
pub const WINDOW: u64 = 1440;

#[derive(Debug, Clone, Copy)]
struct QueryResult {
    timestamp: u64,
    results: usize,
}

pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    requests: VecDeque<QueryResult>,
    no_result_requests: usize,
    current_time: u64,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        Self {
            server,
            requests: VecDeque::new(),
            no_result_requests: 0,
            current_time: 0,
        }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> search_core::Result<Vec<Document>> {
        self.add_find_request_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn add_find_request_by_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> search_core::Result<Vec<Document>> {
        self.add_find_request_by(raw_query, move |_, document_status, _| document_status == status)
    }

    pub fn add_find_request_by<P>(&mut self, raw_query: &str, predicate: P) -> search_core::Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.add_find_request_with(ExecutionPolicy::Sequential, raw_query, predicate)
    }

    /// Run a query and record its result count. Rejected queries are not
    /// recorded.
    pub fn add_find_request_with<P>(
        &mut self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> search_core::Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let found = self.server.find_top_documents_with(policy, raw_query, predicate)?;
        self.add_request(found.len());
        Ok(found)
    }

    /// Requests in the current window that returned nothing.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn add_request(&mut self, results: usize) {
        self.current_time += 1;
        while let Some(oldest) = self.requests.front() {
            if self.current_time - oldest.timestamp < WINDOW {
                break;
            }
            if oldest.results == 0 {
                self.no_result_requests -= 1;
            }
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult {
            timestamp: self.current_time,
            results,
        });
        if results == 0 {
            self.no_result_requests += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_requests_leave_the_window() {
        let mut server = SearchServer::with_stop_words("and in at").unwrap();
        server.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        server.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        server.add_document(3, "big cat fancy collar ", DocumentStatus::Actual, &[1, 2, 8]).unwrap();
        server.add_document(4, "big dog sparrow Eugene", DocumentStatus::Actual, &[1, 3, 2]).unwrap();
        server.add_document(5, "big dog sparrow Vasiliy", DocumentStatus::Actual, &[1, 1, 1]).unwrap();

        let mut queue = RequestQueue::new(&server);
        for _ in 0..1439 {
            queue.add_find_request("empty request").unwrap();
        }
        queue.add_find_request("curly dog").unwrap();
        assert_eq!(queue.no_result_requests(), 1439);
        queue.add_find_request("big collar").unwrap();
        assert_eq!(queue.no_result_requests(), 1438);
        queue.add_find_request("sparrow").unwrap();
        assert_eq!(queue.no_result_requests(), 1437);
    }

    #[test]
    fn rejected_queries_are_not_counted() {
        let server = SearchServer::new();
        let mut queue = RequestQueue::new(&server);
        assert!(queue.add_find_request("--broken").is_err());
        assert_eq!(queue.no_result_requests(), 0);
        queue.add_find_request("nothing").unwrap();
        assert_eq!(queue.no_result_requests(), 1);
    }
}
