use crate::{
    database::{
        db::{DbClient, DbError},
        db_structs::{User, UserRatingChange}
    },
    model::{
        constants::{MAX_RATING, MIN_RATING},
        ranking_engine::RankingEngine,
        structures::rating_stats::RatingStats
    }
};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Rating {} is outside [{}, {}]", .0, MIN_RATING, MAX_RATING)]
    InvalidRating(i32),

    #[error(transparent)]
    Database(#[from] DbError)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedUser {
    pub id: i32,
    pub username: String,
    pub rating: i32,
    /// `None` when the stored rating falls outside the ranked domain
    pub rank: Option<i32>,
    pub updated_at: DateTime<FixedOffset>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub page: i64,
    pub page_size: i64,
    pub stats: RatingStats,
    pub users: Vec<RankedUser>
}

pub fn validate_rating(rating: i32) -> Result<i32, LeaderboardError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(LeaderboardError::InvalidRating(rating))
    }
}

/// Rejects the whole batch if any change targets a rating outside the domain.
pub fn validate_changes(changes: &[UserRatingChange]) -> Result<(), LeaderboardError> {
    changes.iter().try_for_each(|c| validate_rating(c.new_rating).map(|_| ()))
}

/// Merges repeated users into a single change from their first `old_rating`
/// to their last `new_rating`, keeping first-seen order. Users whose net
/// change is a no-op are dropped.
pub fn coalesce_changes(changes: &[UserRatingChange]) -> Vec<UserRatingChange> {
    let mut merged: IndexMap<i32, UserRatingChange> = IndexMap::with_capacity(changes.len());

    for change in changes {
        merged
            .entry(change.user_id)
            .and_modify(|c| c.new_rating = change.new_rating)
            .or_insert(*change);
    }

    merged.into_values().filter(|c| c.old_rating != c.new_rating).collect()
}

/// Annotates `users` with their current rank using a single batch query.
pub fn rank_users(engine: &RankingEngine, users: Vec<User>) -> Vec<RankedUser> {
    let ratings = users.iter().map(|u| u.rating).collect_vec();
    let ranks = engine.get_rank_batch(&ratings);

    users
        .into_iter()
        .zip(ranks)
        .map(|(user, rank)| RankedUser {
            id: user.id,
            username: user.username,
            rating: user.rating,
            rank,
            updated_at: user.updated_at
        })
        .collect()
}

/// Clamps a 1-based `page` and a `page_size` to valid values and returns `(limit, offset)`.
pub fn page_bounds(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    (page_size, (page - 1).saturating_mul(page_size))
}

pub async fn leaderboard_page(
    engine: &RankingEngine,
    db: &DbClient,
    page: i64,
    page_size: i64
) -> Result<LeaderboardPage, LeaderboardError> {
    let (limit, offset) = page_bounds(page, page_size);
    let users = db.get_users_page(limit, offset).await?;

    Ok(LeaderboardPage {
        page: page.max(1),
        page_size: limit,
        stats: engine.get_stats(),
        users: rank_users(engine, users)
    })
}

/// Validates `changes`, applies them to the engine as one atomic batch, then
/// persists them. Both sides receive the same coalesced batch, so a user that
/// appears more than once moves exactly once in memory and in storage.
///
/// The engine is updated first and is not rolled back if the durable write
/// fails: ranking follows the in-memory view, which may briefly run ahead of
/// storage.
pub async fn apply_rating_changes(
    engine: &RankingEngine,
    db: &DbClient,
    changes: &[UserRatingChange]
) -> Result<u64, LeaderboardError> {
    validate_changes(changes)?;

    let changes = coalesce_changes(changes);
    let rating_changes = changes.iter().map(UserRatingChange::rating_change).collect_vec();
    engine.batch_update_ratings(&rating_changes);

    match db.update_ratings(&changes).await {
        Ok(updated) => {
            debug!("Applied {} rating changes ({} persisted)", changes.len(), updated);
            Ok(updated)
        }
        Err(e) => {
            warn!("Rating changes applied in memory but not persisted: {}", e);
            Err(e.into())
        }
    }
}
