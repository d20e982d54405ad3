//! Deterministic embedding strategy for the retrieval engine
//!
//! The embedder is a pluggable seam: any deterministic mapping from text to
//! a fixed-length vector satisfies the contract (identical inputs must map
//! to identical vectors). The default is a character-sum-seeded
//! trigonometric function, a stand-in for a real embedding model.

pub const EMBEDDING_DIM: usize = 64;

pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Default deterministic embedder
pub struct TrigEmbedder;

impl Embedder for TrigEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let normalized = text.trim().to_lowercase();
        let char_sum: f32 = normalized.chars().map(|c| c as u32 as f32).sum();
        let seed = char_sum + normalized.chars().count() as f32;

        (0..EMBEDDING_DIM)
            .map(|i| ((seed + i as f32) * 0.1).sin())
            .collect()
    }
}

/// Cosine similarity between two equal-length vectors; 0.0 for zero norms
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
