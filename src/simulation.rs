use crate::{
    database::db_structs::{User, UserRatingChange},
    model::structures::rating_domain::RatingDomain
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Produces random rating movements for a sample of users, used to drive the
/// engine and the database with realistic write traffic.
pub struct RatingSimulator {
    rng: ChaCha8Rng,
    domain: RatingDomain,
    max_delta: i32
}

impl RatingSimulator {
    /// A `seed` makes the generated changes reproducible; without one the
    /// generator is seeded randomly. Negative deltas are treated as zero.
    pub fn new(seed: Option<u64>, max_delta: i32) -> RatingSimulator {
        let seed = seed.unwrap_or_else(rand::random);
        debug!("Rating simulator seeded with {}", seed);

        RatingSimulator {
            rng: ChaCha8Rng::seed_from_u64(seed),
            domain: RatingDomain::DEFAULT,
            max_delta: max_delta.max(0)
        }
    }

    pub fn with_domain(mut self, domain: RatingDomain) -> RatingSimulator {
        self.domain = domain;
        self
    }

    /// `current` moved by a uniform delta in `[-max_delta, max_delta]`, clamped into the domain.
    pub fn next_rating(&mut self, current: i32) -> i32 {
        let delta = self.rng.random_range(-self.max_delta..=self.max_delta);
        let next = (current as i64 + delta as i64).clamp(self.domain.min() as i64, self.domain.max() as i64);

        next as i32
    }

    /// One change per user; users whose rating did not move are skipped.
    pub fn generate_changes(&mut self, users: &[User]) -> Vec<UserRatingChange> {
        users
            .iter()
            .map(|user| UserRatingChange {
                user_id: user.id,
                old_rating: user.rating,
                new_rating: self.next_rating(user.rating)
            })
            .filter(|change| change.old_rating != change.new_rating)
            .collect()
    }
}
