//! Embedding providers
//!
//! - `EmbeddingProvider` trait for abstraction
//! - `HashingEmbedder`: deterministic feature hashing, always available
//! - `FastEmbedProvider`: local sentence-embedding model (`fastembed` feature)

mod hashing;
mod provider;

pub use hashing::HashingEmbedder;
#[cfg(feature = "fastembed")]
pub use provider::FastEmbedProvider;
pub use provider::{EmbeddingError, EmbeddingProvider};

use crate::config::EmbeddingConfig;
use crate::error::{NetcfgError, Result};
use std::sync::Arc;

/// Build the provider named in the configuration
pub fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimension)?)),
        #[cfg(feature = "fastembed")]
        "fastembed" => Ok(Arc::new(FastEmbedProvider::new(
            &config.model,
            config.batch_size,
        )?)),
        #[cfg(not(feature = "fastembed"))]
        "fastembed" => Err(NetcfgError::Embedding(
            "netcfg was built without the `fastembed` feature".to_string(),
        )),
        other => Err(NetcfgError::Embedding(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}
