mod ollama;

pub use ollama::OllamaEmbeddingClient;

use crate::error::{AnalysisError, Result};

/// Cosine similarity of two embedding vectors, in [-1, 1].
///
/// A zero vector has no direction, so its similarity to anything is 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(AnalysisError::EmbeddingError(format!(
            "embedding dimensions differ ({} vs {})",
            a.len(),
            b.len()
        )));
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}
