use crate::model::structures::{rating_change::RatingChange, rating_domain::RatingDomain, rating_stats::RatingStats};

/// Count of participants per rating value across a fixed [`RatingDomain`].
///
/// `buckets[i]` holds the number of participants rated exactly `domain.rating_at(i)`.
/// `total_users` always equals the sum of all buckets: every increment or decrement
/// that actually lands on a bucket moves it by one, so domain-crossing changes
/// keep it in step.
///
/// This type does no locking; [`crate::model::ranking_engine::RankingEngine`] wraps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDistribution {
    domain: RatingDomain,
    buckets: Vec<u64>,
    total_users: u64
}

impl RatingDistribution {
    pub fn new(domain: RatingDomain) -> RatingDistribution {
        RatingDistribution {
            domain,
            buckets: vec![0; domain.len()],
            total_users: 0
        }
    }

    /// Builds a distribution from `(rating, count)` pairs.
    /// Out-of-domain ratings and non-positive counts are skipped.
    pub fn from_counts<I>(domain: RatingDomain, counts: I) -> RatingDistribution
    where
        I: IntoIterator<Item = (i32, i64)>
    {
        let mut distribution = RatingDistribution::new(domain);

        for (rating, count) in counts {
            if count <= 0 {
                continue;
            }

            if let Some(idx) = domain.index(rating) {
                distribution.buckets[idx] += count as u64;
                distribution.total_users += count as u64;
            }
        }

        distribution
    }

    pub fn domain(&self) -> RatingDomain {
        self.domain
    }

    pub fn total_users(&self) -> u64 {
        self.total_users
    }

    /// Number of participants holding exactly `rating`. Zero outside the domain.
    pub fn count(&self, rating: i32) -> u64 {
        self.domain.index(rating).map_or(0, |idx| self.buckets[idx])
    }

    /// Number of distinct occupied ratings strictly greater than `rating`.
    ///
    /// Ratings below the domain count every occupied bucket, ratings at or
    /// above the domain's maximum count none.
    pub fn distinct_above(&self, rating: i32) -> u32 {
        let first = match rating.checked_add(1) {
            Some(r) => r.max(self.domain.min()),
            None => return 0
        };

        match self.domain.index(first) {
            Some(start) => self.buckets[start..].iter().filter(|&&c| c > 0).count() as u32,
            None => 0
        }
    }

    /// `result[i]` is the number of distinct occupied ratings strictly greater
    /// than `domain.rating_at(i)`, computed in one reverse pass.
    pub fn cumulative_above(&self) -> Vec<u32> {
        let mut cumulative = vec![0; self.buckets.len()];
        let mut distinct_above = 0;

        for (idx, count) in self.buckets.iter().enumerate().rev() {
            cumulative[idx] = distinct_above;
            if *count > 0 {
                distinct_above += 1;
            }
        }

        cumulative
    }

    /// Moves one participant from `old_rating` to `new_rating`.
    ///
    /// The old side is only decremented if it is in the domain and occupied,
    /// the new side is only incremented if it is in the domain.
    pub fn apply(&mut self, change: RatingChange) {
        if change.is_noop() {
            return;
        }

        if let Some(idx) = self.domain.index(change.old_rating) {
            if self.buckets[idx] > 0 {
                self.buckets[idx] -= 1;
                self.total_users -= 1;
            }
        }

        if let Some(idx) = self.domain.index(change.new_rating) {
            self.buckets[idx] += 1;
            self.total_users += 1;
        }
    }

    pub fn stats(&self) -> RatingStats {
        let mut unique_ratings = 0;
        let mut min_rating_with_users = None;
        let mut max_rating_with_users = None;

        for (idx, count) in self.buckets.iter().enumerate() {
            if *count == 0 {
                continue;
            }

            let rating = self.domain.rating_at(idx);
            unique_ratings += 1;
            min_rating_with_users.get_or_insert(rating);
            max_rating_with_users = Some(rating);
        }

        RatingStats {
            total_users: self.total_users,
            unique_ratings,
            min_rating_with_users,
            max_rating_with_users
        }
    }

    /// Sum of all buckets, recomputed from scratch.
    pub fn bucket_sum(&self) -> u64 {
        self.buckets.iter().sum()
    }
}
