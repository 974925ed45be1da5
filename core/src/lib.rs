//! In-memory TF-IDF search index with plus/minus word queries,
//! sequential and parallel ranking, request tracking and duplicate removal.

pub mod concurrent_map;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod policy;
pub mod process_queries;
pub mod query;
pub mod remove_duplicates;
pub mod request_queue;
pub mod tokenizer;

pub use concurrent_map::ConcurrentMap;
pub use document::{DocId, Document, DocumentStatus};
pub use error::{Error, Result};
pub use index::{DocumentIds, MatchedDocument, SearchServer, TermId};
pub use policy::{DocumentPredicate, ExecutionPolicy};
pub use process_queries::{process_queries, process_queries_joined};
pub use query::Query;
pub use remove_duplicates::{find_duplicates, remove_duplicates};
pub use request_queue::RequestQueue;
