pub mod args;
pub mod database;
pub mod leaderboard;
pub mod model;
pub mod simulation;
pub mod utils;
