//! Weighted directed PageRank by power iteration.

use rtinfluence_core::{Error, Result};

use crate::graph::DirectedWeightedGraph;

const DEFAULT_DAMPING: f64 = 0.85;
const DEFAULT_MAX_ITER: usize = 100;
const DEFAULT_TOL: f64 = 1e-10;

/// PageRank over `g`'s weighted directed edges. Dangling nodes (zero
/// out-strength) redistribute their mass uniformly over all vertices, the
/// standard fix for a well-defined stationary distribution.
pub fn pagerank(g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
    pagerank_with(g, DEFAULT_DAMPING, DEFAULT_MAX_ITER, DEFAULT_TOL)
}

pub fn pagerank_with(g: &DirectedWeightedGraph, damping: f64, max_iter: usize, tol: f64) -> Result<Vec<f64>> {
    let n = g.n;
    if n == 0 {
        return Ok(Vec::new());
    }
    let out_strength: Vec<f64> = (0..n).map(|v| g.out_strength(v)).collect();
    let mut rank = vec![1.0 / n as f64; n];
    let base = (1.0 - damping) / n as f64;

    for _ in 0..max_iter {
        let dangling_mass: f64 =
            (0..n).filter(|&v| out_strength[v] == 0.0).map(|v| rank[v]).sum();
        let mut next = vec![base + damping * dangling_mass / n as f64; n];
        for u in 0..n {
            if out_strength[u] == 0.0 {
                continue;
            }
            let share = rank[u] / out_strength[u];
            for &(v, w) in &g.out_adj[u] {
                next[v] += damping * share * w;
            }
        }
        let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta < tol {
            return Ok(rank);
        }
    }
    let sum: f64 = rank.iter().sum();
    if (sum - 1.0).abs() > 0.05 {
        return Err(Error::algorithm("pagerank", "failed to converge within tolerance"));
    }
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtinfluence_core::BaseEdge;

    fn edge(src: &str, dst: &str) -> BaseEdge {
        BaseEdge {
            src: src.to_string(),
            dst: dst.to_string(),
            weight: 1,
        }
    }

    #[test]
    fn pagerank_sums_to_one() {
        let g = DirectedWeightedGraph::from_edges(&[
            edge("A", "B"),
            edge("B", "C"),
            edge("C", "A"),
            edge("A", "C"),
        ]);
        let pr = pagerank(&g).unwrap();
        let sum: f64 = pr.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn star_hub_has_lower_rank_than_each_leaf_redistributes() {
        // A -> B, C, D (dangling leaves); with damping, A's rank is determined
        // by the uniform teleport plus dangling redistribution, not by leaves.
        let g = DirectedWeightedGraph::from_edges(&[edge("A", "B"), edge("A", "C"), edge("A", "D")]);
        let pr = pagerank(&g).unwrap();
        assert!((pr.iter().sum::<f64>() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn empty_graph_yields_empty_vector() {
        let g = DirectedWeightedGraph::from_edges(&[]);
        assert!(pagerank(&g).unwrap().is_empty());
    }
}
