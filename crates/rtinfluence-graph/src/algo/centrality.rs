//! Optional heavy centrality measures over the undirected projection:
//! eigenvector centrality (power iteration), betweenness (Brandes' algorithm,
//! unweighted), and closeness. Gated behind `extra_centrality` since they are
//! the most expensive primitives in the metrics pack.

use std::collections::VecDeque;

use rtinfluence_core::{Error, Result};

const MAX_ITER: usize = 200;
const TOL: f64 = 1e-8;

/// Eigenvector centrality by power iteration on the undirected adjacency,
/// normalized to unit L2 norm.
pub fn eigenvector(adj: &[Vec<usize>]) -> Result<Vec<f64>> {
    let n = adj.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..MAX_ITER {
        let mut next = vec![0.0; n];
        for u in 0..n {
            for &v in &adj[u] {
                next[v] += x[u];
            }
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(Error::algorithm("eigenvector", "graph has no edges to iterate over"));
        }
        for v in next.iter_mut() {
            *v /= norm;
        }
        let delta: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if delta < TOL {
            break;
        }
    }
    Ok(x)
}

/// Brandes' algorithm for unweighted betweenness centrality, normalized by
/// `(n-1)(n-2)` for directed-style normalization collapsed onto the
/// undirected projection (divide by 2 since each shortest path is counted
/// from both endpoints).
pub fn betweenness(adj: &[Vec<usize>]) -> Vec<f64> {
    let n = adj.len();
    let mut centrality = vec![0.0; n];
    for s in 0..n {
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut stack = Vec::new();
        let mut queue = VecDeque::new();
        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adj[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }
        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }
    let norm = if n > 2 { ((n - 1) * (n - 2)) as f64 } else { 1.0 };
    centrality.iter().map(|c| c / (2.0 * norm)).collect()
}

/// Closeness centrality: `(reachable-1) / sum(distances)` scaled by
/// `(reachable-1)/(n-1)` (the Wasserman-Faust correction for disconnected
/// graphs), 0 for isolated vertices.
pub fn closeness(adj: &[Vec<usize>]) -> Vec<f64> {
    let n = adj.len();
    let mut out = vec![0.0; n];
    for s in 0..n {
        let mut dist = vec![-1i64; n];
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            for &w in &adj[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
            }
        }
        let reachable: i64 = dist.iter().filter(|&&d| d > 0).count() as i64;
        let sum_dist: i64 = dist.iter().filter(|&&d| d > 0).sum();
        if reachable == 0 || sum_dist == 0 || n < 2 {
            out[s] = 0.0;
        } else {
            out[s] = (reachable as f64 / sum_dist as f64) * (reachable as f64 / (n as f64 - 1.0));
        }
    }
    out
}
