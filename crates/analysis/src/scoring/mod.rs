pub mod engine;
pub mod extremes;
pub mod service;

pub use engine::{GrammarResult, ScoreBreakdown, ScoringEngine};
pub use extremes::CompetitionExtremes;
