use crate::model::structures::rating_change::RatingChange;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub rating: i32,
    pub updated_at: DateTime<FixedOffset>
}

/// A pending rating change for one stored user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingChange {
    pub user_id: i32,
    pub old_rating: i32,
    pub new_rating: i32
}

impl UserRatingChange {
    pub fn rating_change(&self) -> RatingChange {
        RatingChange::new(self.old_rating, self.new_rating)
    }
}
