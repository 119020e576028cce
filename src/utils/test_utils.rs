use crate::{
    database::db_structs::User,
    model::{
        constants::{MAX_RATING, MIN_RATING},
        ranking_engine::RankingEngine,
        structures::{rating_change::RatingChange, rating_domain::RatingDomain}
    }
};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// `{5000: 10, 4999: 5, 1000: 3}`
pub fn scenario_snapshot() -> HashMap<i32, i64> {
    HashMap::from([(5000, 10), (4999, 5), (1000, 3)])
}

pub fn scenario_engine() -> RankingEngine {
    RankingEngine::from_counts(RatingDomain::DEFAULT, scenario_snapshot())
}

/// Up to `n_ratings` distinct in-domain ratings, each held by 1 to 50 users.
pub fn generate_snapshot(n_ratings: usize, seed: u64) -> HashMap<i32, i64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut snapshot = HashMap::with_capacity(n_ratings);

    for _ in 0..n_ratings {
        let rating = rng.random_range(MIN_RATING..=MAX_RATING);
        snapshot.insert(rating, rng.random_range(1..=50));
    }

    snapshot
}

/// Random changes, roughly one in twenty touching a rating outside the domain
/// and one in twenty being a no-op.
pub fn generate_rating_changes(n: usize, seed: u64) -> Vec<RatingChange> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let old_rating = random_rating(&mut rng);
            let new_rating = if rng.random_ratio(1, 20) {
                old_rating
            } else {
                random_rating(&mut rng)
            };

            RatingChange::new(old_rating, new_rating)
        })
        .collect()
}

fn random_rating(rng: &mut ChaCha8Rng) -> i32 {
    if rng.random_ratio(1, 20) {
        if rng.random_bool(0.5) {
            MIN_RATING - 1 - rng.random_range(0..100)
        } else {
            MAX_RATING + 1 + rng.random_range(0..1000)
        }
    } else {
        rng.random_range(MIN_RATING..=MAX_RATING)
    }
}

pub fn generate_user(id: i32, username: &str, rating: i32) -> User {
    User {
        id,
        username: username.to_string(),
        rating,
        updated_at: Utc::now().fixed_offset()
    }
}

/// Users `1..=n` with in-domain ratings.
pub fn generate_users(n: i32, seed: u64) -> Vec<User> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=n)
        .map(|id| generate_user(id, &format!("user{}", id), rng.random_range(MIN_RATING..=MAX_RATING)))
        .collect()
}
