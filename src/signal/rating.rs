//! Star rating bucketing.

use crate::error::{Result, TriageError};

/// Groups star ratings into three ordinal buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingBucket;

impl RatingBucket {
    /// Column name of the bucketed rating.
    pub const NAME: &'static str = "grouped_rating";

    /// {4, 5} → 2, {3} → 1, {1, 2} → 0.
    pub fn bucket(rating: i64) -> Result<u8> {
        match rating {
            4 | 5 => Ok(2),
            3 => Ok(1),
            1 | 2 => Ok(0),
            other => Err(TriageError::InvalidRating(other)),
        }
    }
}
