pub mod competitions;
pub mod essays;
pub mod leaderboard;
pub mod scoring;
