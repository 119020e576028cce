use std::{collections::HashMap, error::Error as StdError, future::Future};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    rating_distribution::RatingDistribution,
    structures::{rating_change::RatingChange, rating_domain::RatingDomain, rating_stats::RatingStats}
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load rating counts: {0}")]
    Initialization(#[source] Box<dyn StdError + Send + Sync>)
}

/// Supplies the point-in-time `rating -> participant count` snapshot the engine
/// is built from. Consulted exactly once, before the engine serves traffic.
pub trait RatingCountSource {
    type Error: StdError + Send + Sync + 'static;

    fn rating_counts(&self) -> impl Future<Output = Result<HashMap<i32, i64>, Self::Error>> + Send;
}

/// Dense ranking over a bounded rating domain.
///
/// Participants sharing a rating share a rank, rank 1 being the highest occupied
/// rating. Reads take the lock in shared mode, updates take it exclusively, and
/// a batch update holds it for the whole batch.
#[derive(Debug)]
pub struct RankingEngine {
    distribution: RwLock<RatingDistribution>
}

impl Default for RankingEngine {
    fn default() -> Self {
        RankingEngine::new(RatingDomain::DEFAULT)
    }
}

impl RankingEngine {
    /// Creates an engine with every bucket empty.
    pub fn new(domain: RatingDomain) -> RankingEngine {
        RankingEngine {
            distribution: RwLock::new(RatingDistribution::new(domain))
        }
    }

    pub fn from_counts<I>(domain: RatingDomain, counts: I) -> RankingEngine
    where
        I: IntoIterator<Item = (i32, i64)>
    {
        RankingEngine {
            distribution: RwLock::new(RatingDistribution::from_counts(domain, counts))
        }
    }

    /// Loads the snapshot from `source` over the default domain.
    pub async fn initialize<S>(source: &S) -> Result<RankingEngine, EngineError>
    where
        S: RatingCountSource + Sync
    {
        Self::initialize_with_domain(source, RatingDomain::DEFAULT).await
    }

    pub async fn initialize_with_domain<S>(source: &S, domain: RatingDomain) -> Result<RankingEngine, EngineError>
    where
        S: RatingCountSource + Sync
    {
        info!("Loading rating counts...");
        let counts = source
            .rating_counts()
            .await
            .map_err(|e| EngineError::Initialization(Box::new(e)))?;

        let (dropped_ratings, dropped_users) = counts
            .iter()
            .filter(|(rating, count)| !domain.contains(**rating) && **count > 0)
            .fold((0usize, 0i64), |(ratings, users), (_, count)| (ratings + 1, users + count));

        if dropped_ratings > 0 {
            warn!(
                "Ignoring {} users across {} ratings outside [{}, {}]",
                dropped_users,
                dropped_ratings,
                domain.min(),
                domain.max()
            );
        }

        let engine = RankingEngine::from_counts(domain, counts);
        let stats = engine.get_stats();

        info!(
            "Ranking engine initialized with {} users across {} unique ratings",
            stats.total_users, stats.unique_ratings
        );

        Ok(engine)
    }

    pub fn domain(&self) -> RatingDomain {
        self.distribution.read().domain()
    }

    /// Number of participants currently holding exactly `rating`.
    pub fn count(&self, rating: i32) -> u64 {
        self.distribution.read().count(rating)
    }

    /// `1 + ` the number of distinct occupied ratings strictly above `rating`.
    ///
    /// The rating is not validated: anything above the domain ranks 1, anything
    /// below it ranks after every occupied rating. Callers that need to reject
    /// such input check it against the domain first.
    pub fn get_rank(&self, rating: i32) -> i32 {
        let distribution = self.distribution.read();

        1 + distribution.distinct_above(rating) as i32
    }

    /// Ranks for every rating in `ratings`, in the same order, against a single
    /// consistent snapshot. Ratings outside the domain are unrankable and map to `None`.
    pub fn get_rank_batch(&self, ratings: &[i32]) -> Vec<Option<i32>> {
        let distribution = self.distribution.read();
        let domain = distribution.domain();
        let cumulative_above = distribution.cumulative_above();

        ratings
            .iter()
            .map(|rating| domain.index(*rating).map(|idx| 1 + cumulative_above[idx] as i32))
            .collect()
    }

    pub fn update_rating(&self, old_rating: i32, new_rating: i32) {
        let change = RatingChange::new(old_rating, new_rating);

        if change.is_noop() {
            return;
        }

        self.distribution.write().apply(change);
    }

    /// Applies every change, in order, under one exclusive lock acquisition.
    pub fn batch_update_ratings(&self, changes: &[RatingChange]) {
        if changes.is_empty() {
            return;
        }

        let mut distribution = self.distribution.write();
        for change in changes {
            distribution.apply(*change);
        }

        debug!("Applied batch of {} rating changes", changes.len());
    }

    pub fn get_stats(&self) -> RatingStats {
        self.distribution.read().stats()
    }

    /// Copy of the current distribution, taken under the shared lock.
    pub fn snapshot(&self) -> RatingDistribution {
        self.distribution.read().clone()
    }
}
