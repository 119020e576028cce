use serde::{Deserialize, Serialize};

/// A single participant moving from one rating to another.
/// Only used as input to updates, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub old_rating: i32,
    pub new_rating: i32
}

impl RatingChange {
    pub fn new(old_rating: i32, new_rating: i32) -> Self {
        RatingChange { old_rating, new_rating }
    }

    pub fn is_noop(&self) -> bool {
        self.old_rating == self.new_rating
    }
}
