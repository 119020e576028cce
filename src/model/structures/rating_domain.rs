use crate::model::constants::{MAX_RATING, MIN_RATING};
use serde::Serialize;

/// Closed range of ratings the engine keeps a bucket for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RatingDomain {
    min: i32,
    max: i32
}

impl Default for RatingDomain {
    fn default() -> Self {
        RatingDomain::DEFAULT
    }
}

impl RatingDomain {
    pub const DEFAULT: RatingDomain = RatingDomain {
        min: MIN_RATING,
        max: MAX_RATING
    };

    /// Upper bound on the number of buckets a domain may span.
    pub const MAX_LEN: usize = 1 << 20;

    /// Returns `None` when `min > max` or the range spans more than
    /// [`RatingDomain::MAX_LEN`] ratings.
    pub fn new(min: i32, max: i32) -> Option<Self> {
        if min > max || max as i64 - min as i64 + 1 > Self::MAX_LEN as i64 {
            return None;
        }

        Some(RatingDomain { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, rating: i32) -> bool {
        rating >= self.min && rating <= self.max
    }

    /// Bucket index of `rating`, or `None` if it falls outside the domain.
    pub fn index(&self, rating: i32) -> Option<usize> {
        if self.contains(rating) {
            Some((rating as i64 - self.min as i64) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`RatingDomain::index`]. Callers pass indices below `len()`.
    pub fn rating_at(&self, index: usize) -> i32 {
        self.min + index as i32
    }

    /// Never zero, the range always holds at least one rating.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1) as usize
    }
}
