use std::collections::HashMap;

use openmemory_core::constants::{
    GAMMA_SPREAD, SPREAD_MAX_ACTIVE_NODES, SPREAD_MAX_SOURCES_PER_HOP,
    SPREAD_MAX_TOTAL_TRAVERSALS, SPREAD_MIN_ACTIVATION,
};

/// Output of a spreading-activation pass: every node that ended up with
/// nonzero activation, including the original seeds.
#[derive(Debug, Clone, Default)]
pub struct SpreadingActivationResult {
    pub activations: HashMap<String, f64>,
    /// `true` if a safety budget cut the pass short of exhausting the frontier.
    pub truncated: bool,
}

/// Spreads activation energy outward from a set of seed memories over the
/// waypoint graph, hop by hop, decaying by `e^(-gamma * hop)` per hop.
///
/// `neighbors` resolves a node id to its outgoing `(dst_id, edge_weight)`
/// pairs; it is supplied by the caller (the storage layer) so this crate
/// stays I/O-free. Four safety budgets bound the worst case on a dense or
/// cyclic graph: sources considered per hop, total edge traversals, total
/// distinct active nodes tracked, and a minimum activation floor below
/// which a node is dropped from the frontier.
pub fn spreading_activation<F>(
    seeds: &[(String, f64)],
    max_hops: usize,
    neighbors: F,
) -> SpreadingActivationResult
where
    F: Fn(&str) -> Vec<(String, f64)>,
{
    let mut activations: HashMap<String, f64> = HashMap::new();
    for (id, a) in seeds {
        let e = activations.entry(id.clone()).or_insert(0.0);
        *e = e.max(*a);
    }

    let mut frontier: Vec<(String, f64)> = seeds.to_vec();
    let mut total_traversals = 0usize;
    let mut truncated = false;

    for hop in 1..=max_hops {
        if frontier.is_empty() {
            break;
        }
        if total_traversals >= SPREAD_MAX_TOTAL_TRAVERSALS {
            truncated = true;
            break;
        }

        let mut sources = frontier;
        if sources.len() > SPREAD_MAX_SOURCES_PER_HOP {
            sources.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            sources.truncate(SPREAD_MAX_SOURCES_PER_HOP);
            truncated = true;
        }

        let hop_decay = (-GAMMA_SPREAD * hop as f64).exp();
        let mut next_frontier: HashMap<String, f64> = HashMap::new();

        'sources: for (src_id, src_activation) in &sources {
            for (dst_id, weight) in neighbors(src_id) {
                if total_traversals >= SPREAD_MAX_TOTAL_TRAVERSALS {
                    truncated = true;
                    break 'sources;
                }
                total_traversals += 1;

                let delta = src_activation * weight * hop_decay;
                if delta < SPREAD_MIN_ACTIVATION {
                    continue;
                }

                if activations.len() >= SPREAD_MAX_ACTIVE_NODES
                    && !activations.contains_key(&dst_id)
                {
                    truncated = true;
                    continue;
                }

                let e = activations.entry(dst_id.clone()).or_insert(0.0);
                *e = (*e + delta).clamp(0.0, 1.0);

                let f = next_frontier.entry(dst_id).or_insert(0.0);
                *f = f.max(delta);
            }
        }

        frontier = next_frontier.into_iter().collect();
    }

    SpreadingActivationResult { activations, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_neighbors(id: &str) -> Vec<(String, f64)> {
        match id {
            "a" => vec![("b".to_string(), 0.9)],
            "b" => vec![("c".to_string(), 0.9)],
            "c" => vec![("d".to_string(), 0.9)],
            _ => vec![],
        }
    }

    #[test]
    fn activation_decays_with_hop_distance() {
        let result = spreading_activation(&[("a".to_string(), 1.0)], 3, chain_neighbors);
        let b = *result.activations.get("b").unwrap();
        let c = *result.activations.get("c").unwrap();
        assert!(b > c);
    }

    #[test]
    fn seed_activation_is_preserved() {
        let result = spreading_activation(&[("a".to_string(), 1.0)], 2, chain_neighbors);
        assert_eq!(*result.activations.get("a").unwrap(), 1.0);
    }

    #[test]
    fn zero_hops_only_contains_seeds() {
        let result = spreading_activation(&[("a".to_string(), 1.0)], 0, chain_neighbors);
        assert_eq!(result.activations.len(), 1);
        assert!(!result.truncated);
    }

    #[test]
    fn disconnected_node_never_activates() {
        let result = spreading_activation(&[("a".to_string(), 1.0)], 5, chain_neighbors);
        assert!(result.activations.get("zzz").is_none());
    }

    #[test]
    fn oversized_frontier_respects_source_budget() {
        let seeds: Vec<(String, f64)> = (0..600).map(|i| (format!("n{i}"), 1.0)).collect();
        let result = spreading_activation(&seeds, 1, |_| vec![]);
        assert!(result.truncated);
    }
}
