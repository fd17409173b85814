//! Louvain community detection over a weighted undirected graph: local
//! moving phase plus multi-level aggregation, seeded for determinism.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Configuration knobs for a Louvain run.
#[derive(Debug, Clone, Copy)]
pub struct LouvainConfig {
    pub max_levels: usize,
    pub max_local_passes: usize,
    pub seed: u64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            max_local_passes: 20,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LouvainResult {
    /// Community id per original vertex, dense `0..k` in first-seen order.
    pub communities: Vec<usize>,
    pub modularity: f64,
}

/// Run Louvain on an undirected weighted graph given as a symmetric
/// adjacency list: `adj[u]` lists `(v, weight)` for every edge incident to
/// `u`, with both directions present for each edge (self-loops listed once
/// with their full weight).
pub fn louvain(adj: &[Vec<(usize, f64)>], config: LouvainConfig) -> LouvainResult {
    let n = adj.len();
    if n == 0 {
        return LouvainResult {
            communities: Vec::new(),
            modularity: f64::NAN,
        };
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    // `node_to_original[level][node_at_level]` = list of original vertices folded into it.
    let mut membership: Vec<usize> = (0..n).collect();
    let mut cur_adj = adj.to_vec();

    for _level in 0..config.max_levels {
        let comm = local_moving(&cur_adj, config.max_local_passes, &mut rng);
        let distinct = distinct_count(&comm);
        // Fold this level's communities into membership for all original vertices.
        for m in membership.iter_mut() {
            *m = comm[*m];
        }
        if distinct == cur_adj.len() {
            // No communities merged this level; converged.
            break;
        }
        cur_adj = aggregate(&cur_adj, &comm, distinct);
    }

    let communities = relabel_first_seen(&membership);
    let modularity = modularity_of(adj, &communities);
    LouvainResult {
        communities,
        modularity,
    }
}

fn distinct_count(labels: &[usize]) -> usize {
    labels.iter().copied().collect::<std::collections::HashSet<_>>().len()
}

/// One (or more) passes of greedy local moves: each vertex joins the
/// neighboring community that most increases modularity, or stays if no
/// community improves on its current one. Runs until no vertex moves or
/// `max_passes` is reached.
fn local_moving(adj: &[Vec<(usize, f64)>], max_passes: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let n = adj.len();
    let degree: Vec<f64> = adj.iter().map(|nbrs| nbrs.iter().map(|(_, w)| w).sum()).collect();
    let m2: f64 = degree.iter().sum();
    let mut community: Vec<usize> = (0..n).collect();
    let mut sigma_tot: Vec<f64> = degree.clone();

    if m2 == 0.0 {
        return community;
    }

    let mut order: Vec<usize> = (0..n).collect();
    for _ in 0..max_passes.max(1) {
        order.shuffle(rng);
        let mut moved = false;
        for &u in &order {
            let cu = community[u];
            sigma_tot[cu] -= degree[u];

            let mut weight_to_comm: HashMap<usize, f64> = HashMap::new();
            for &(v, w) in &adj[u] {
                if v == u {
                    continue;
                }
                *weight_to_comm.entry(community[v]).or_insert(0.0) += w;
            }

            let mut best_comm = cu;
            let mut best_gain = weight_to_comm.get(&cu).copied().unwrap_or(0.0) / m2
                - sigma_tot[cu] * degree[u] / (2.0 * m2 * m2);
            for (&c, &k_in) in &weight_to_comm {
                if c == cu {
                    continue;
                }
                let gain = k_in / m2 - sigma_tot[c] * degree[u] / (2.0 * m2 * m2);
                if gain > best_gain + 1e-12 {
                    best_gain = gain;
                    best_comm = c;
                }
            }
            sigma_tot[best_comm] += degree[u];
            if best_comm != cu {
                moved = true;
            }
            community[u] = best_comm;
        }
        if !moved {
            break;
        }
    }
    relabel_first_seen(&community)
}

/// Build the aggregated graph where each super-node is a community from the
/// previous level; intra-community weight becomes a self-loop.
fn aggregate(adj: &[Vec<(usize, f64)>], comm: &[usize], k: usize) -> Vec<Vec<(usize, f64)>> {
    let mut agg: Vec<HashMap<usize, f64>> = vec![HashMap::new(); k];
    for (u, nbrs) in adj.iter().enumerate() {
        for &(v, w) in nbrs {
            let cu = comm[u];
            let cv = comm[v];
            *agg[cu].entry(cv).or_insert(0.0) += w;
        }
    }
    agg.into_iter().map(|m| m.into_iter().collect()).collect()
}

fn relabel_first_seen(labels: &[usize]) -> Vec<usize> {
    let mut map = HashMap::new();
    labels
        .iter()
        .map(|&l| {
            let next = map.len();
            *map.entry(l).or_insert(next)
        })
        .collect()
}

/// `Q = (1/2m) * sum_ij (A_ij - k_i*k_j/2m) * delta(c_i,c_j)`, evaluated
/// directly on the original (unaggregated) adjacency and the final
/// community assignment.
pub fn modularity_of(adj: &[Vec<(usize, f64)>], communities: &[usize]) -> f64 {
    let n = adj.len();
    if n == 0 {
        return f64::NAN;
    }
    let degree: Vec<f64> = adj.iter().map(|nbrs| nbrs.iter().map(|(_, w)| w).sum()).collect();
    let m2: f64 = degree.iter().sum();
    if m2 == 0.0 {
        return f64::NAN;
    }
    let mut q = 0.0;
    for u in 0..n {
        for &(v, w) in &adj[u] {
            if communities[u] == communities[v] {
                q += w - degree[u] * degree[v] / m2;
            }
        }
    }
    q / m2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(edges: &[(usize, usize, f64)], n: usize) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); n];
        for &(u, v, w) in edges {
            adj[u].push((v, w));
            adj[v].push((u, w));
        }
        adj
    }

    #[test]
    fn two_disjoint_triangles_form_two_communities() {
        let edges = [
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
        ];
        let adj = sym(&edges, 6);
        let result = louvain(&adj, LouvainConfig { seed: 7, ..Default::default() });
        assert_eq!(result.communities[0], result.communities[1]);
        assert_eq!(result.communities[1], result.communities[2]);
        assert_eq!(result.communities[3], result.communities[4]);
        assert_eq!(result.communities[4], result.communities[5]);
        assert_ne!(result.communities[0], result.communities[3]);
        assert!(result.modularity > 0.0);
    }

    #[test]
    fn empty_graph_yields_empty_result() {
        let result = louvain(&[], LouvainConfig::default());
        assert!(result.communities.is_empty());
        assert!(result.modularity.is_nan());
    }

    #[test]
    fn single_community_spanning_all_vertices_has_zero_modularity() {
        let adj = sym(&[(0, 1, 1.0)], 2);
        let communities = vec![0, 0];
        assert!((modularity_of(&adj, &communities) - 0.0).abs() < 1e-9);
    }
}
