//! Execution mode selection and document filtering for searches.

use crate::document::{DocId, DocumentStatus};

/// Chooses between the single-threaded and the fanned-out variant of an operation.
/// Parallel variants join all workers before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

/// Decides whether a document may be ranked.
///
/// Implemented for closures `Fn(DocId, DocumentStatus, i32) -> bool` and for
/// [`DocumentStatus`], which accepts documents carrying exactly that status.
/// Minus words exclude documents regardless of the predicate.
pub trait DocumentPredicate: Sync {
    fn accepts(&self, document_id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentPredicate for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    fn accepts(&self, document_id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(document_id, status, rating)
    }
}

impl DocumentPredicate for DocumentStatus {
    fn accepts(&self, _document_id: DocId, status: DocumentStatus, _rating: i32) -> bool {
        *self == status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_predicate_matches_exact_status() {
        assert!(DocumentStatus::Banned.accepts(1, DocumentStatus::Banned, 0));
        assert!(!DocumentStatus::Actual.accepts(1, DocumentStatus::Banned, 0));
    }

    #[test]
    fn closures_see_all_three_arguments() {
        let even_rated = |id: DocId, _status: DocumentStatus, rating: i32| id % 2 == 0 && rating > 0;
        assert!(even_rated.accepts(2, DocumentStatus::Removed, 1));
        assert!(!even_rated.accepts(3, DocumentStatus::Actual, 1));
        assert!(!even_rated.accepts(2, DocumentStatus::Actual, 0));
    }
}
