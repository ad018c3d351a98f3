//! Deterministic hashing embedder
//!
//! Feature-hashes lowercase tokens and adjacent token pairs into a fixed
//! number of buckets with a signed blake3 hash, then L2-normalizes. No model
//! download, same vector for the same text on every machine.

use super::provider::{EmbeddingError, EmbeddingProvider};

const BIGRAM_WEIGHT: f32 = 0.5;

pub struct HashingEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InitializationError(
                "dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            model_name: format!("blake3-hashing-{}", dimension),
        })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = blake3::hash(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        let value = u64::from_le_bytes(bytes);

        let bucket = (value % self.dimension as u64) as usize;
        let sign = if value >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

/// Lowercase tokens with surrounding punctuation stripped
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_ascii_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = tokenize(text);

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let a = embedder.embed("interface Gi1/0/1\n description uplink").unwrap();
        let b = embedder.embed("interface Gi1/0/1\n description uplink").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 128);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_tokens_score_higher() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let query = embedder.embed("access-list permit").unwrap();
        let acl = embedder
            .embed("ip access-list extended MGMT\n permit tcp any any eq 22")
            .unwrap();
        let vlan = embedder.embed("vlan 10\n name DATA").unwrap();

        assert!(cosine_similarity(&query, &acl) > cosine_similarity(&query, &vlan));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        let v = embedder.embed("  !  ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let texts = vec!["router ospf 1".to_string(), "ntp server 1.1.1.1".to_string()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch[1], embedder.embed("ntp server 1.1.1.1").unwrap());
    }
}
