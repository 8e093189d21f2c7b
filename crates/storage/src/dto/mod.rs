pub mod competition;
pub mod essay;
pub mod leaderboard;
pub mod scoring;
