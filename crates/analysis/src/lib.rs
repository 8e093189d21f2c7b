pub mod error;
pub mod grammar;
pub mod scoring;
pub mod topic;
pub mod traits;

pub use error::{AnalysisError, Result};
pub use grammar::{GrammarMatch, IssueKind, LanguageToolClient};
pub use scoring::{CompetitionExtremes, GrammarResult, ScoreBreakdown, ScoringEngine};
pub use topic::OllamaEmbeddingClient;
pub use traits::{GrammarChecker, TopicScorer};
