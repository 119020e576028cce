use serde::Serialize;

/// Aggregate view over the rating distribution.
/// `min_rating_with_users` and `max_rating_with_users` are `None` when no bucket is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub total_users: u64,
    pub unique_ratings: u32,
    pub min_rating_with_users: Option<i32>,
    pub max_rating_with_users: Option<i32>
}
