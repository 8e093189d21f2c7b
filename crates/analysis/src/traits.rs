use crate::Result;
use crate::grammar::GrammarMatch;

/// Grammar and spell checking over free text
#[async_trait::async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>>;
}

/// Semantic similarity between a topic prompt and an essay
#[async_trait::async_trait]
pub trait TopicScorer: Send + Sync {
    /// Cosine similarity in [-1, 1]
    async fn similarity(&self, topic: &str, text: &str) -> Result<f64>;
}
