use openmemory_core::memory::Sector;
use openmemory_core::models::Classification;

/// Extension point for a per-tenant learned classifier (§4.3, Open
/// Question (b)): classifies a precomputed mean vector instead of raw
/// text. No training pipeline lives in this crate or anywhere else in the
/// workspace; this trait only defines the inference-time contract a
/// future model-serving component could satisfy.
pub trait LearnedOverride: Send + Sync {
    /// Returns `None` when no tenant-specific model is loaded.
    fn classify_vector(&self, mean_vec: &[f32]) -> Option<(Sector, f64)>;
}

/// Adopts the learned label over the regex path's result only when the
/// regex path landed on low-confidence `semantic` and the learned model
/// is confident (> 0.6), per §4.3.
pub fn apply_override(regex_result: Classification, learned: Option<(Sector, f64)>) -> Classification {
    let low_confidence_semantic = regex_result.primary == Sector::Semantic && regex_result.confidence <= 0.2;
    match learned {
        Some((sector, confidence)) if low_confidence_semantic && confidence > 0.6 => {
            Classification::single(sector, confidence)
        }
        _ => regex_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adopts_confident_learned_label_over_low_confidence_semantic() {
        let regex_result = Classification::single(Sector::Semantic, 0.2);
        let out = apply_override(regex_result, Some((Sector::Procedural, 0.9)));
        assert_eq!(out.primary, Sector::Procedural);
    }

    #[test]
    fn ignores_learned_label_when_regex_path_was_confident() {
        let regex_result = Classification::single(Sector::Episodic, 0.8);
        let out = apply_override(regex_result.clone(), Some((Sector::Procedural, 0.9)));
        assert_eq!(out, regex_result);
    }

    #[test]
    fn ignores_low_confidence_learned_label() {
        let regex_result = Classification::single(Sector::Semantic, 0.2);
        let out = apply_override(regex_result.clone(), Some((Sector::Procedural, 0.5)));
        assert_eq!(out, regex_result);
    }
}
