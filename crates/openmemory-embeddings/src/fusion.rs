//! Fusion for the "smart" tier: weighted element-wise sum of a synthetic
//! and a semantic (provider) vector for the same sector, L2-normalized.
//! Weights normalize to 1 before fusion (§4.4).

/// Panics if `v1.len() != v2.len()` — callers only fuse same-sector,
/// same-dimension vectors (both already resized to `vec_dim`).
pub fn fuse(v1: &[f32], v2: &[f32], w1: f64, w2: f64) -> Vec<f32> {
    assert_eq!(v1.len(), v2.len(), "fusion requires equal-length vectors");
    let total = w1 + w2;
    let (w1, w2) = if total > 0.0 { (w1 / total, w2 / total) } else { (0.5, 0.5) };

    let mut out: Vec<f32> = v1.iter().zip(v2).map(|(a, b)| (*a as f64 * w1 + *b as f64 * w2) as f32).collect();

    let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut out {
            *x /= norm;
        }
    }
    out
}

/// Sector-specific fusion weights, e.g. semantic 0.4/0.6, procedural 0.45/0.55.
pub fn sector_fusion_weights(sector: openmemory_core::memory::Sector) -> (f64, f64) {
    use openmemory_core::memory::Sector;
    match sector {
        Sector::Semantic => (0.4, 0.6),
        Sector::Procedural => (0.45, 0.55),
        Sector::Episodic => (0.5, 0.5),
        Sector::Emotional => (0.5, 0.5),
        Sector::Reflective => (0.45, 0.55),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fused_output_is_unit_norm() {
        let v1 = vec![1.0, 0.0, 0.0];
        let v2 = vec![0.0, 1.0, 0.0];
        let fused = fuse(&v1, &v2, 0.4, 0.6);
        let norm: f32 = fused.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn equal_weights_average_identical_vectors() {
        let v = vec![1.0, 0.0];
        let fused = fuse(&v, &v, 1.0, 1.0);
        assert!((fused[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn weights_normalize_before_fusion() {
        let v1 = vec![1.0, 0.0];
        let v2 = vec![0.0, 1.0];
        let a = fuse(&v1, &v2, 2.0, 3.0);
        let b = fuse(&v1, &v2, 0.4, 0.6);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }
}
