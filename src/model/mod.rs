pub mod constants;
pub mod rating_distribution;
pub mod ranking_engine;
pub mod structures;

pub use ranking_engine::{EngineError, RankingEngine, RatingCountSource};
pub use structures::{rating_change::RatingChange, rating_domain::RatingDomain, rating_stats::RatingStats};
