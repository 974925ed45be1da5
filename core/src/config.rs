//! Tuning constants for ranking, request tracking and the parallel paths.

/// Upper bound on the number of documents returned by a top-documents search.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are treated as equal and ordered by rating instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Capacity of the request window: one request per minute over a day.
pub const MIN_IN_DAY: usize = 1440;

/// Minimum bucket count of the relevance map built by parallel ranking.
pub const DEFAULT_BUCKET_COUNT: usize = 100;
