use crate::config::RELEVANCE_EPSILON;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Caller-assigned document identifier. Live ids are never negative.
pub type DocId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self { id, relevance, rating }
    }

    /// Ranking order: relevance first, rating when relevances are within epsilon.
    /// Greater means ranked higher.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        if (self.relevance - other.relevance).abs() < RELEVANCE_EPSILON {
            self.rating.cmp(&other.rating)
        } else {
            self.relevance.total_cmp(&other.relevance)
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.rating == other.rating
            && (self.relevance - other.relevance).abs() < RELEVANCE_EPSILON
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

/// Arithmetic mean of the ratings truncated toward zero, 0 for no ratings.
pub fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}
