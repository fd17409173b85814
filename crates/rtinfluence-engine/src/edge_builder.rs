//! Groups a window's events into weighted directed edges.

use std::collections::BTreeMap;

use rtinfluence_core::stats::stats_pack;
use rtinfluence_core::{BaseEdge, Event};

/// Result of building edges from a window's events.
#[derive(Debug, Clone, Default)]
pub struct EdgeBuildResult {
    pub edges: Vec<BaseEdge>,
    pub n_self_loops_removed: u64,
    /// `stats_pack` over edge weights: mean/std/min/max/p50/p90/p99.
    pub weight_stats: BTreeMap<String, f64>,
}

/// Group events by `(src, dst)`, weight = event count. When `drop_self_loops`
/// is set, `src == dst` edges are excluded and counted in `n_self_loops_removed`
/// rather than silently dropped.
pub fn build_edges(events: &[Event], drop_self_loops: bool) -> EdgeBuildResult {
    let mut counts: BTreeMap<(String, String), i64> = BTreeMap::new();
    let mut n_self_loops_removed = 0u64;

    for ev in events {
        if drop_self_loops && ev.src == ev.dst {
            n_self_loops_removed += 1;
            continue;
        }
        *counts.entry((ev.src.clone(), ev.dst.clone())).or_insert(0) += 1;
    }

    let edges: Vec<BaseEdge> = counts
        .into_iter()
        .map(|((src, dst), weight)| BaseEdge { src, dst, weight })
        .collect();

    let weights: Vec<f64> = edges.iter().map(|e| e.weight as f64).collect();
    let weight_stats = stats_pack(&weights, "edge_w");

    EdgeBuildResult {
        edges,
        n_self_loops_removed,
        weight_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(src: &str, dst: &str) -> Event {
        Event {
            company: "ACME".into(),
            src: src.into(),
            dst: dst.into(),
            ts: 0,
        }
    }

    #[test]
    fn duplicate_pairs_accumulate_weight() {
        let events = vec![ev("A", "B"), ev("A", "B"), ev("A", "C")];
        let result = build_edges(&events, false);
        assert_eq!(result.edges.len(), 2);
        let ab = result.edges.iter().find(|e| e.src == "A" && e.dst == "B").unwrap();
        assert_eq!(ab.weight, 2);
    }

    #[test]
    fn self_loops_are_removed_and_counted_when_requested() {
        let events = vec![ev("A", "A"), ev("A", "B")];
        let result = build_edges(&events, true);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.n_self_loops_removed, 1);
    }

    #[test]
    fn self_loops_are_kept_by_default() {
        let events = vec![ev("A", "A"), ev("A", "B")];
        let result = build_edges(&events, false);
        assert_eq!(result.edges.len(), 2);
        assert_eq!(result.n_self_loops_removed, 0);
    }

    #[test]
    fn empty_events_yield_empty_edges_and_no_panic_on_stats() {
        let result = build_edges(&[], false);
        assert!(result.edges.is_empty());
        assert!(result.weight_stats.get("edge_w_mean").unwrap().is_nan());
    }
}
