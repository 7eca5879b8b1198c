use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::salience::Salience;
use super::sector::Sector;

/// The universal memory row. Every ingested "memory" in the system is one
/// of these; its embeddings live in [`crate::models::Vector`] rows keyed by
/// `(id, sector, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// UUID v4 identifier.
    pub id: String,
    /// Tenant key. `None`/"anonymous" is an accepted degenerate tenant.
    pub user_id: Option<String>,
    /// Rotation bucket; memories beyond `seg_size` roll to the next segment.
    pub segment: i64,
    /// Plaintext content (encrypted at rest when the Store's encryption
    /// filter is enabled — classification/simhash always see plaintext).
    pub content: String,
    /// 64-bit lexical simhash fingerprint, stored hex-encoded.
    pub simhash: String,
    /// Fixed at creation unless an explicit sector-change update occurs.
    pub primary_sector: Sector,
    pub tags: Vec<String>,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub salience: Salience,
    pub decay_lambda: f64,
    /// Monotonically increases on content update.
    pub version: u32,
    pub mean_dim: usize,
    /// Raw float32 vector for the primary sector (used as the fallback mean
    /// when per-sector vectors aren't loaded).
    pub mean_vec: Vec<f32>,
    pub compressed_vec: Option<Vec<u8>>,
    pub feedback_score: f64,
}

impl Memory {
    /// Construct a fresh memory row with sane defaults for a brand-new insert.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        user_id: Option<String>,
        content: String,
        simhash: String,
        primary_sector: Sector,
        tags: Vec<String>,
        meta: serde_json::Value,
        mean_vec: Vec<f32>,
        decay_lambda: f64,
    ) -> Self {
        let now = Utc::now();
        let mean_dim = mean_vec.len();
        Self {
            id,
            user_id,
            segment: 0,
            content,
            simhash,
            primary_sector,
            tags,
            meta,
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience: Salience::new(0.5),
            decay_lambda,
            version: 1,
            mean_dim,
            mean_vec,
            compressed_vec: None,
            feedback_score: 0.0,
        }
    }

    /// Tenant key normalized to a comparable string ("anonymous" for `None`).
    pub fn tenant_key(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// 64-bit simhash over whitespace tokens — used for near-duplicate detection
/// on [`crate::traits::Store::get_memory_by_simhash`].
///
/// Each token is hashed with blake3, folded into 64 bits, and its bit pattern
/// votes +1/-1 into 64 accumulators; the final fingerprint is the sign of
/// each accumulator.
pub fn simhash64(text: &str) -> u64 {
    let mut acc = [0i64; 64];
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return 0;
    }

    for tok in &tokens {
        let hash = blake3::hash(tok.to_lowercase().as_bytes());
        let bytes = hash.as_bytes();
        let mut v = 0u64;
        for i in 0..8 {
            v = (v << 8) | bytes[i] as u64;
        }
        for (bit, a) in acc.iter_mut().enumerate() {
            if (v >> bit) & 1 == 1 {
                *a += 1;
            } else {
                *a -= 1;
            }
        }
    }

    let mut fingerprint: u64 = 0;
    for (bit, a) in acc.iter().enumerate() {
        if *a > 0 {
            fingerprint |= 1 << bit;
        }
    }
    fingerprint
}

/// Hex-encode a simhash for storage.
pub fn simhash64_hex(text: &str) -> String {
    format!("{:016x}", simhash64(text))
}

/// Canonical lowercased token set, used for query/memory token overlap scoring.
pub fn canonical_tokens(text: &str) -> std::collections::HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simhash_is_deterministic() {
        let a = simhash64("the quick brown fox");
        let b = simhash64("the quick brown fox");
        assert_eq!(a, b);
    }

    #[test]
    fn simhash_differs_for_distinct_text() {
        let a = simhash64("I visited Paris last summer");
        let b = simhash64("We chose gRPC for the payment gateway");
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_tokens_lowercases_and_splits() {
        let toks = canonical_tokens("Trip to Paris!");
        assert!(toks.contains("trip"));
        assert!(toks.contains("paris"));
        assert!(!toks.contains("Paris"));
    }

    #[test]
    fn tenant_key_defaults_to_anonymous() {
        let m = Memory::new(
            "id".into(),
            None,
            "hello".into(),
            simhash64_hex("hello"),
            Sector::Semantic,
            vec![],
            serde_json::json!({}),
            vec![0.0; 8],
            0.01,
        );
        assert_eq!(m.tenant_key(), "anonymous");
    }
}
