//! Tunable constants and default weights for classification, embedding,
//! and retrieval dynamics. See §6 of the design spec for the authoritative
//! values; everything here is overridable through [`crate::config`].

use crate::memory::Sector;

/// OpenMemory crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// All sectors in declaration order. Declaration order breaks classifier ties.
pub const ALL_SECTORS: [Sector; 5] = [
    Sector::Episodic,
    Sector::Semantic,
    Sector::Procedural,
    Sector::Emotional,
    Sector::Reflective,
];

/// Synthetic-embedding / resonance sector weights.
pub const SECTOR_WEIGHT_EPISODIC: f64 = 1.3;
pub const SECTOR_WEIGHT_SEMANTIC: f64 = 1.0;
pub const SECTOR_WEIGHT_PROCEDURAL: f64 = 1.2;
pub const SECTOR_WEIGHT_EMOTIONAL: f64 = 1.4;
pub const SECTOR_WEIGHT_REFLECTIVE: f64 = 0.9;

/// Resonance matrix M\[memory_sector\]\[query_sector\], rows/cols in `ALL_SECTORS` order.
pub const RESONANCE_MATRIX: [[f64; 5]; 5] = [
    [1.0, 0.7, 0.3, 0.6, 0.6],
    [0.7, 1.0, 0.4, 0.7, 0.8],
    [0.3, 0.4, 1.0, 0.5, 0.2],
    [0.6, 0.7, 0.5, 1.0, 0.8],
    [0.6, 0.8, 0.2, 0.8, 1.0],
];

/// Dual-phase decay: fast / slow lambdas and consolidation coefficient theta.
pub const LAMBDA_FAST: f64 = 0.015;
pub const LAMBDA_SLOW: f64 = 0.002;
pub const DECAY_THETA: f64 = 0.4;

/// Retrieval reinforcement gain.
pub const ETA_REINFORCEMENT: f64 = 0.18;

/// Spreading activation hop decay.
pub const GAMMA_SPREAD: f64 = 0.35;

/// Recency half-life-ish tau (days) and cutoff (days).
pub const RECENCY_TAU_DAYS: f64 = 0.5;
pub const RECENCY_MAX_DAYS: f64 = 60.0;

/// Waypoint maintenance reinforcement gain and default temporal tau (hours).
pub const WAYPOINT_ETA: f64 = 0.1;
pub const WAYPOINT_TAU_HOURS_DEFAULT: f64 = 72.0;
pub const WAYPOINT_MAX_WEIGHT: f64 = 1.0;
pub const WAYPOINT_PRUNE_THRESHOLD_DEFAULT: f64 = 0.05;

/// Combined-score sigmoid sharpening factor applied to raw similarity.
pub const SIM_BOOST_TAU: f64 = 0.5;

/// Default scoring weights for the combined score in HSG::query.
pub const W_SIM: f64 = 0.35;
pub const W_OVERLAP: f64 = 0.20;
pub const W_WAYPOINT: f64 = 0.15;
pub const W_RECENCY: f64 = 0.10;
pub const W_TAG: f64 = 0.20;

/// Spreading-activation safety budgets.
pub const SPREAD_MAX_SOURCES_PER_HOP: usize = 500;
pub const SPREAD_MAX_TOTAL_TRAVERSALS: usize = 10_000;
pub const SPREAD_MAX_ACTIVE_NODES: usize = 2_000;
pub const SPREAD_MIN_ACTIVATION: f64 = 0.05;

/// Embedding cache (LRU, TTL-bound) sizing.
pub const EMBED_CACHE_SIZE: u64 = 500;
pub const EMBED_CACHE_TTL_SECS: u64 = 300;

/// Maximum bulk batch size accepted by the Store.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Coactivation buffer bound (drops newest enqueue on overflow).
pub const COACTIVATION_BUFFER_CAPACITY: usize = 500;
pub const COACTIVATION_DRAIN_BATCH: usize = 50;

/// Maintenance scan chunk size for cursor-paginated decay passes.
pub const DECAY_SCAN_CHUNK: usize = 1000;
pub const ORPHAN_PRUNE_BATCH: usize = 500;
pub const ORPHAN_PRUNE_YIELD_EVERY: usize = 5000;

/// Resolve the synthetic/resonance weight for a sector.
pub fn sector_weight(sector: Sector) -> f64 {
    match sector {
        Sector::Episodic => SECTOR_WEIGHT_EPISODIC,
        Sector::Semantic => SECTOR_WEIGHT_SEMANTIC,
        Sector::Procedural => SECTOR_WEIGHT_PROCEDURAL,
        Sector::Emotional => SECTOR_WEIGHT_EMOTIONAL,
        Sector::Reflective => SECTOR_WEIGHT_REFLECTIVE,
    }
}

/// Index of a sector in `ALL_SECTORS` / `RESONANCE_MATRIX`.
pub fn sector_index(sector: Sector) -> usize {
    match sector {
        Sector::Episodic => 0,
        Sector::Semantic => 1,
        Sector::Procedural => 2,
        Sector::Emotional => 3,
        Sector::Reflective => 4,
    }
}

/// Look up the resonance factor between a memory's sector and a query's sector.
pub fn resonance(memory_sector: Sector, query_sector: Sector) -> f64 {
    RESONANCE_MATRIX[sector_index(memory_sector)][sector_index(query_sector)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resonance_diagonal_is_one() {
        for s in ALL_SECTORS {
            assert_eq!(resonance(s, s), 1.0);
        }
    }

    #[test]
    fn resonance_matrix_is_symmetric() {
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(RESONANCE_MATRIX[i][j], RESONANCE_MATRIX[j][i]);
            }
        }
    }
}
