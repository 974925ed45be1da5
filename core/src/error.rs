//! Error types for the search index.

use crate::document::DocId;
use thiserror::Error;

/// Result alias used by every fallible index operation
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A stop word, document word or query word contains a control character
    #[error("word {0:?} contains a control character")]
    InvalidWord(String),

    #[error("document id {0} is negative")]
    InvalidDocumentId(DocId),

    #[error("document with id {0} already exists")]
    DuplicateDocumentId(DocId),

    /// A bare `-` or a token starting with `--`
    #[error("invalid minus word {0:?} in query")]
    InvalidMinusWord(String),

    #[error("document with id {0} not found")]
    DocumentNotFound(DocId),
}
