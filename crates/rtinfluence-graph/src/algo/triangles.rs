//! Triangle counts per vertex on the undirected projection, by forward-only
//! neighbor-set intersection (each triangle counted once per incident vertex).

use std::collections::HashSet;

/// `t_v` for each vertex: number of triangles incident to `v`.
pub fn triangle_count_per_vertex(adj: &[Vec<usize>]) -> Vec<u64> {
    let n = adj.len();
    let sets: Vec<HashSet<usize>> = adj.iter().map(|a| a.iter().copied().collect()).collect();
    let mut counts = vec![0u64; n];
    for u in 0..n {
        for &v in &adj[u] {
            if v <= u {
                continue;
            }
            for &w in &adj[u] {
                if w <= v {
                    continue;
                }
                if sets[v].contains(&w) {
                    counts[u] += 1;
                    counts[v] += 1;
                    counts[w] += 1;
                }
            }
        }
    }
    counts
}

/// `total_triangles = sum(t_v) / 3`.
pub fn total_triangles(t: &[u64]) -> u64 {
    t.iter().sum::<u64>() / 3
}

/// `transitivity = 3 * total_triangles / sum_v(d_v*(d_v-1)/2)`, NaN if the
/// denominator is zero.
pub fn transitivity(adj: &[Vec<usize>], total_tri: u64) -> f64 {
    let denom: u64 = adj
        .iter()
        .map(|a| {
            let d = a.len() as u64;
            d * d.saturating_sub(1) / 2
        })
        .sum();
    if denom == 0 {
        f64::NAN
    } else {
        3.0 * total_tri as f64 / denom as f64
    }
}

/// `avg_clustering = mean_v(2*t_v / (d_v*(d_v-1)))`, with 0 for `d_v < 2`.
pub fn avg_clustering(adj: &[Vec<usize>], t: &[u64]) -> f64 {
    if adj.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = adj
        .iter()
        .zip(t)
        .map(|(a, &tv)| {
            let d = a.len();
            if d < 2 {
                0.0
            } else {
                2.0 * tv as f64 / (d as f64 * (d as f64 - 1.0))
            }
        })
        .sum();
    sum / adj.len() as f64
}

/// Fraction of vertices with undirected degree exactly 1.
pub fn leaf_share(adj: &[Vec<usize>]) -> f64 {
    if adj.is_empty() {
        return f64::NAN;
    }
    adj.iter().filter(|a| a.len() == 1).count() as f64 / adj.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_one_triangle_per_vertex() {
        let adj = vec![vec![1, 2], vec![0, 2], vec![0, 1]];
        let t = triangle_count_per_vertex(&adj);
        assert_eq!(t, vec![1, 1, 1]);
        assert_eq!(total_triangles(&t), 1);
        assert!((transitivity(&adj, 1) - 1.0).abs() < 1e-9);
        assert!((avg_clustering(&adj, &t) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn star_has_no_triangles_and_full_leaf_share() {
        let adj = vec![vec![1, 2, 3], vec![0], vec![0], vec![0]];
        let t = triangle_count_per_vertex(&adj);
        assert_eq!(total_triangles(&t), 0);
        assert!((leaf_share(&adj) - 0.75).abs() < 1e-9);
    }
}
