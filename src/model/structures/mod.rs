pub mod rating_change;
pub mod rating_domain;
pub mod rating_stats;
