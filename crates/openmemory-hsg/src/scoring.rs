//! Per-candidate scoring helpers used by `HsgEngine::query` (§4.6 step 7).
//! Each factor is a free function so it can be unit-tested in isolation;
//! `DynamicsEngine::combined_score` does the final weighted blend.

use std::collections::{HashMap, HashSet};

use openmemory_core::memory::Sector;

/// Cosine similarity between two equal-length vectors, 0 if either is
/// zero-length or zero-norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let na: f64 = a.iter().map(|x| *x as f64 * *x as f64).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| *x as f64 * *x as f64).sum::<f64>().sqrt();
    if na <= f64::EPSILON || nb <= f64::EPSILON {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Multi-vector fusion score: for each sector the candidate has a vector
/// in and the query was embedded for, `sim(query, candidate) * W[sector]`,
/// divided by the sum of weights used. Zero if there's no overlap in
/// embedded sectors.
pub fn multi_vector_fusion_score(
    query_vecs: &HashMap<Sector, Vec<f32>>,
    candidate_vecs: &HashMap<Sector, Vec<f32>>,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (sector, qv) in query_vecs {
        if let Some(cv) = candidate_vecs.get(sector) {
            let w = openmemory_core::constants::sector_weight(*sector);
            weighted_sum += cosine(qv, cv) * w;
            weight_total += w;
        }
    }
    if weight_total <= f64::EPSILON {
        0.0
    } else {
        weighted_sum / weight_total
    }
}

/// `|q ∩ m| / |q|`, zero if the query has no tokens.
pub fn token_overlap(query_tokens: &HashSet<String>, memory_tokens: &HashSet<String>) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let hits = query_tokens.intersection(memory_tokens).count();
    hits as f64 / query_tokens.len() as f64
}

/// Tag-match score against the query's token set: an exact tag match
/// scores 2, a substring match (either direction) scores 1, normalized by
/// `2 * max(1, tags.len())` into `[0, 1]`.
pub fn tag_match_score(tags: &[String], query_tokens: &HashSet<String>) -> f64 {
    if tags.is_empty() || query_tokens.is_empty() {
        return 0.0;
    }
    let mut raw = 0.0;
    for tag in tags {
        let tag_lc = tag.to_lowercase();
        if query_tokens.contains(&tag_lc) {
            raw += 2.0;
        } else if query_tokens.iter().any(|t| tag_lc.contains(t.as_str()) || t.contains(tag_lc.as_str())) {
            raw += 1.0;
        }
    }
    (raw / (2.0 * tags.len().max(1) as f64)).clamp(0.0, 1.0)
}

/// Local graph-connectivity bonus: the strongest waypoint edge (in either
/// direction) between `candidate_id` and any other id in `other_ids`.
pub fn waypoint_strength(
    candidate_id: &str,
    other_ids: &[String],
    edges: &HashMap<String, Vec<(String, f64)>>,
) -> f64 {
    let mut best = 0.0f64;
    if let Some(outgoing) = edges.get(candidate_id) {
        for (dst, w) in outgoing {
            if other_ids.iter().any(|o| o == dst) {
                best = best.max(*w);
            }
        }
    }
    for other in other_ids {
        if other == candidate_id {
            continue;
        }
        if let Some(outgoing) = edges.get(other) {
            for (dst, w) in outgoing {
                if dst == candidate_id {
                    best = best.max(*w);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_cosine_one() {
        let v = vec![1.0f32, 2.0, 3.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_cosine_zero() {
        assert!((cosine(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn fusion_score_uses_only_shared_sectors() {
        let mut q = HashMap::new();
        q.insert(Sector::Semantic, vec![1.0f32, 0.0]);
        q.insert(Sector::Episodic, vec![1.0f32, 0.0]);
        let mut c = HashMap::new();
        c.insert(Sector::Semantic, vec![1.0f32, 0.0]);
        let score = multi_vector_fusion_score(&q, &c);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn no_shared_sector_scores_zero() {
        let mut q = HashMap::new();
        q.insert(Sector::Semantic, vec![1.0f32, 0.0]);
        let c = HashMap::new();
        assert_eq!(multi_vector_fusion_score(&q, &c), 0.0);
    }

    #[test]
    fn full_token_overlap_is_one() {
        let q: HashSet<String> = ["paris", "trip"].iter().map(|s| s.to_string()).collect();
        assert!((token_overlap(&q, &q) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exact_tag_match_outscores_substring() {
        let q: HashSet<String> = ["rust"].iter().map(|s| s.to_string()).collect();
        let exact = tag_match_score(&["rust".to_string()], &q);
        let sub = tag_match_score(&["rustacean".to_string()], &q);
        assert!(exact > sub);
    }

    #[test]
    fn waypoint_strength_finds_either_direction() {
        let mut edges = HashMap::new();
        edges.insert("a".to_string(), vec![("b".to_string(), 0.7)]);
        assert_eq!(waypoint_strength("b", &["a".to_string()], &edges), 0.7);
        assert_eq!(waypoint_strength("a", &["b".to_string()], &edges), 0.7);
    }
}
