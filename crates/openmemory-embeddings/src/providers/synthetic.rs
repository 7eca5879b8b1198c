//! Synthetic hashing-trick embedding provider.
//!
//! No external dependencies, deterministic, CPU-only — the fallback every
//! other provider ultimately degrades to, and the only provider the
//! "fast"/"hybrid" tiers use directly.

use async_trait::async_trait;
use openmemory_core::constants::sector_weight;
use openmemory_core::errors::OmResult;
use openmemory_core::memory::Sector;
use openmemory_core::traits::EmbeddingProvider;

/// Hashes tokens, character n-grams (2/3-gram), bigrams, trigrams, and
/// skip-grams into fixed-dimension buckets, adds positional sinusoids,
/// scales by the sector weight, then L2-normalizes.
pub struct SyntheticProvider {
    dimensions: usize,
}

impl SyntheticProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_bucket(feature: &str, dims: usize) -> usize {
        let h = blake3::hash(feature.as_bytes());
        let bytes = h.as_bytes();
        let n = u64::from_le_bytes(bytes[0..8].try_into().expect("8 bytes"));
        (n as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn char_ngrams(word: &str, n: usize) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < n {
            return vec![];
        }
        (0..=chars.len() - n).map(|i| chars[i..i + n].iter().collect()).collect()
    }

    fn vectorize(&self, text: &str, sector: Sector) -> Vec<f32> {
        let dims = self.dimensions.max(1);
        let mut v = vec![0.0f32; dims];
        let tokens = Self::tokenize(text);

        for (pos, tok) in tokens.iter().enumerate() {
            v[Self::hash_bucket(&format!("tok:{tok}"), dims)] += 1.0;
            for n in [2, 3] {
                for gram in Self::char_ngrams(tok, n) {
                    v[Self::hash_bucket(&format!("char{n}:{gram}"), dims)] += 0.5;
                }
            }
            // positional sinusoid, anchored to this token's hashed bucket
            let bucket = Self::hash_bucket(&format!("pos:{tok}"), dims);
            v[bucket] += ((pos as f32) * 0.5).sin() * 0.25;
        }

        for window in tokens.windows(2) {
            v[Self::hash_bucket(&format!("bi:{}_{}", window[0], window[1]), dims)] += 0.75;
        }
        for window in tokens.windows(3) {
            v[Self::hash_bucket(&format!("tri:{}_{}_{}", window[0], window[1], window[2]), dims)] += 0.6;
        }
        // skip-grams: token i paired with token i+2, skipping one
        for window in tokens.windows(3) {
            v[Self::hash_bucket(&format!("skip:{}_{}", window[0], window[2]), dims)] += 0.4;
        }

        let weight = sector_weight(sector) as f32;
        for x in &mut v {
            *x *= weight;
        }

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for SyntheticProvider {
    async fn embed_one(&self, text: &str) -> OmResult<Vec<f32>> {
        Ok(self.vectorize(text, Sector::Semantic))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "synthetic"
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl SyntheticProvider {
    /// Sector-aware entry point; `embed_one` (the trait method) always uses
    /// `Sector::Semantic` weighting since `EmbeddingProvider` is sector-blind.
    pub fn embed_for_sector(&self, text: &str, sector: Sector) -> Vec<f32> {
        self.vectorize(text, sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn produces_correct_dimensions() {
        let p = SyntheticProvider::new(128);
        let v = p.embed_one("hello world").await.unwrap();
        assert_eq!(v.len(), 128);
    }

    #[tokio::test]
    async fn output_is_unit_norm() {
        let p = SyntheticProvider::new(256);
        let v = p.embed_one("rust systems programming").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }

    #[tokio::test]
    async fn deterministic() {
        let p = SyntheticProvider::new(128);
        let a = p.embed_one("deterministic text").await.unwrap();
        let b = p.embed_one("deterministic text").await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sector_changes_vector() {
        let p = SyntheticProvider::new(128);
        let episodic = p.embed_for_sector("I went to the market", Sector::Episodic);
        let procedural = p.embed_for_sector("I went to the market", Sector::Procedural);
        assert_ne!(episodic, procedural);
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let p = SyntheticProvider::new(64);
        let v = p.embed_one("").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
