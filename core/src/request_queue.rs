use crate::config::MIN_IN_DAY;
use crate::document::{Document, DocumentStatus};
use crate::error::Result;
use crate::index::SearchServer;
use crate::policy::{DocumentPredicate, ExecutionPolicy};
use std::collections::VecDeque;

struct QueryResult {
    documents: Vec<Document>,
}

/// Sliding window over the most recent search results, tracking how many came back empty.
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    requests: VecDeque<QueryResult>,
    capacity: usize,
    no_result_requests: usize,
    policy: ExecutionPolicy,
}

impl<'a> RequestQueue<'a> {
    /// Window of [`MIN_IN_DAY`] requests.
    pub fn new(server: &'a SearchServer) -> Self {
        Self::with_capacity(server, MIN_IN_DAY)
    }

    pub fn with_capacity(server: &'a SearchServer, capacity: usize) -> Self {
        Self {
            server,
            requests: VecDeque::with_capacity(capacity + 1),
            capacity,
            no_result_requests: 0,
            policy: ExecutionPolicy::Sequential,
        }
    }

    /// Execution mode for the searches this queue runs; sequential by default.
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with(raw_query, DocumentStatus::Actual)
    }

    /// Runs a top-documents search and records the outcome.
    /// A query that fails to parse is not recorded.
    pub fn add_find_request_with<P: DocumentPredicate>(
        &mut self,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>> {
        let documents = self.server.find_top_documents_with(self.policy, raw_query, predicate)?;
        if documents.is_empty() {
            self.no_result_requests += 1;
        }
        self.requests.push_back(QueryResult { documents: documents.clone() });
        if self.requests.len() > self.capacity {
            if let Some(oldest) = self.requests.pop_front() {
                if oldest.documents.is_empty() {
                    self.no_result_requests -= 1;
                }
            }
        }
        Ok(documents)
    }

    pub fn no_result_requests(&self) -> usize { self.no_result_requests }

    /// Number of requests currently in the window.
    pub fn len(&self) -> usize { self.requests.len() }

    pub fn is_empty(&self) -> bool { self.requests.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("and in at").unwrap();
        server.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        server.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        server
    }

    #[test]
    fn counts_only_empty_results_in_window() {
        let server = server();
        let mut queue = RequestQueue::new(&server);
        for _ in 0..1439 {
            queue.add_find_request("empty request").unwrap();
        }
        assert_eq!(queue.no_result_requests(), 1439);
        queue.add_find_request("curly dog").unwrap();
        assert_eq!(queue.no_result_requests(), 1439);
        queue.add_find_request("big collar").unwrap();
        assert_eq!(queue.no_result_requests(), 1438);
        queue.add_find_request("sparrow").unwrap();
        assert_eq!(queue.no_result_requests(), 1438);
        assert_eq!(queue.len(), 1440);
    }

    #[test]
    fn small_window_evicts_oldest_first() {
        let server = server();
        let mut queue = RequestQueue::with_capacity(&server, 2);
        queue.add_find_request("nothing").unwrap();
        queue.add_find_request("cat").unwrap();
        assert_eq!(queue.no_result_requests(), 1);
        queue.add_find_request("cat").unwrap();
        assert_eq!(queue.no_result_requests(), 0);
        queue.add_find_request("nothing").unwrap();
        queue.add_find_request("nothing").unwrap();
        assert_eq!(queue.no_result_requests(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn invalid_queries_are_not_recorded() {
        let server = server();
        let mut queue = RequestQueue::new(&server);
        assert!(queue.add_find_request("cat --dog").is_err());
        assert!(queue.is_empty());
        assert_eq!(queue.no_result_requests(), 0);
    }

    #[test]
    fn parallel_queue_records_the_same_outcomes() {
        let server = server();
        let mut queue = RequestQueue::with_capacity(&server, 3).with_policy(ExecutionPolicy::Parallel);
        assert_eq!(queue.add_find_request("curly cat").unwrap(), server.find_top_documents("curly cat").unwrap());
        queue.add_find_request("sparrow").unwrap();
        assert_eq!(queue.no_result_requests(), 1);
        assert_eq!(queue.capacity(), 3);
    }

    #[test]
    fn predicate_requests_are_tracked() {
        let server = server();
        let mut queue = RequestQueue::new(&server);
        let found = queue.add_find_request_with("curly", DocumentStatus::Banned).unwrap();
        assert!(found.is_empty());
        assert_eq!(queue.no_result_requests(), 1);
    }
}
