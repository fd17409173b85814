//! The Community & Echo Engine: Louvain community detection over the
//! factorized vertex space plus echo-chamber/mixing metrics.
//!
//! Louvain's local-move order is seed-dependent, so two independent runs on
//! the same factorized graph rarely agree exactly; running it twice and
//! reporting both scalars is a cheap stability cross-check rather than a
//! second source of truth — `modularity_factorized` (first run) is
//! authoritative for the community labels used by every downstream metric,
//! `modularity` (second run, distinct seed) is reported alongside it.

use std::collections::BTreeMap;

use rtinfluence_core::stats::{concentration_pack, gini, shannon_entropy};

use crate::capability::GraphCapability;
use crate::graph::DirectedWeightedGraph;

pub type MetricErrors = Vec<(String, String)>;

/// Symmetrized weighted adjacency in the graph's own factorized `0..n` id
/// space, self-loops excluded — the undirected graph Louvain and the echo
/// metrics both operate on.
fn undirected_weighted(g: &DirectedWeightedGraph) -> Vec<Vec<(usize, f64)>> {
    let mut adj: Vec<std::collections::HashMap<usize, f64>> = vec![Default::default(); g.n];
    for u in 0..g.n {
        for &(v, w) in &g.out_adj[u] {
            if v == u {
                continue;
            }
            *adj[u].entry(v).or_insert(0.0) += w;
            *adj[v].entry(u).or_insert(0.0) += w;
        }
    }
    adj.into_iter().map(|m| m.into_iter().collect()).collect()
}

/// Compute community counts/concentration plus echo-chamber mixing metrics,
/// all emitted with a `<prefix>__` key prefix (`echo_` sub-prefix for the
/// mixing-specific metrics, per the data model).
pub fn compute_community_metrics(
    g: &DirectedWeightedGraph,
    backend: &dyn GraphCapability,
    prefix: &str,
    seed: u64,
) -> (BTreeMap<String, f64>, MetricErrors) {
    let mut m = BTreeMap::new();
    let mut errors = MetricErrors::new();
    let key = |name: &str| format!("{prefix}__{name}");

    if g.n == 0 {
        return (m, errors);
    }

    let primary = match backend.louvain(g, seed) {
        Ok(r) => r,
        Err(e) => {
            errors.push((key("louvain"), e.to_string()));
            return (m, errors);
        }
    };
    let cross_check = backend.louvain(g, seed.wrapping_add(1));

    m.insert(key("modularity_factorized"), primary.modularity);
    match cross_check {
        Ok(r) => {
            m.insert(key("modularity"), r.modularity);
        }
        Err(e) => errors.push((key("louvain_cross_check"), e.to_string())),
    }

    let comm = &primary.communities;
    let n_comms = comm.iter().copied().max().map(|c| c + 1).unwrap_or(0);
    let mut sizes = vec![0.0f64; n_comms];
    for &c in comm {
        sizes[c] += 1.0;
    }
    m.insert(key("n_communities"), n_comms as f64);
    m.insert(key("community_size_hhi"), concentration_pack(&sizes, "x")["x_hhi"]);
    m.insert(key("community_size_gini"), gini(&sizes));
    m.insert(key("community_size_entropy"), shannon_entropy(&sizes));
    let total_nodes: f64 = sizes.iter().sum();
    let largest = sizes.iter().cloned().fold(0.0, f64::max);
    m.insert(key("largest_comm_share"), if total_nodes > 0.0 { largest / total_nodes } else { f64::NAN });

    m.extend(echo_chamber_metrics(g, comm, n_comms, &key));

    (m, errors)
}

/// `echo_*` metrics: within/between community weight shares, the weighted
/// EI index, per-community attention concentration, and source-community
/// mixing-matrix row entropy.
fn echo_chamber_metrics(
    g: &DirectedWeightedGraph,
    comm: &[usize],
    n_comms: usize,
    key: &impl Fn(&str) -> String,
) -> BTreeMap<String, f64> {
    let mut m = BTreeMap::new();
    let undirected = undirected_weighted(g);
    let mut within = 0.0;
    let mut between = 0.0;
    // community -> community mixing matrix, row-normalized per source community.
    let mut mix: Vec<Vec<f64>> = vec![vec![0.0; n_comms]; n_comms];
    let mut comm_within_weight = vec![0.0f64; n_comms];

    for u in 0..g.n {
        for &(v, w) in &undirected[u] {
            if v <= u {
                continue;
            }
            let (cu, cv) = (comm[u], comm[v]);
            if cu == cv {
                within += w;
                comm_within_weight[cu] += w;
            } else {
                between += w;
            }
            mix[cu][cv] += w;
            mix[cv][cu] += w;
        }
    }

    let total = within + between;
    m.insert(key("echo_within_comm_weight_share"), if total > 0.0 { within / total } else { f64::NAN });
    m.insert(key("echo_between_comm_weight_share"), if total > 0.0 { between / total } else { f64::NAN });
    m.insert(
        key("echo_EI_index_weighted"),
        if total > 0.0 { (between - within) / total } else { f64::NAN },
    );

    m.insert(key("echo_comm_attention_hhi"), concentration_pack(&comm_within_weight, "x")["x_hhi"]);
    m.insert(key("echo_comm_attention_gini"), gini(&comm_within_weight));
    m.insert(key("echo_comm_attention_entropy"), shannon_entropy(&comm_within_weight));
    let attn_total: f64 = comm_within_weight.iter().sum();
    let attn_largest = comm_within_weight.iter().cloned().fold(0.0, f64::max);
    m.insert(
        key("echo_comm_attention_largest_share"),
        if attn_total > 0.0 { attn_largest / attn_total } else { f64::NAN },
    );

    m.insert(key("echo_mix_entropy_src_to_dst_comm"), mix_entropy(&mix));
    m
}

/// Weighted average (by row mass) of each source community's row entropy
/// in the community-to-community mixing matrix, normalized per row.
fn mix_entropy(mix: &[Vec<f64>]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_mass = 0.0;
    for row in mix {
        let row_total: f64 = row.iter().sum();
        if row_total <= 0.0 {
            continue;
        }
        let entropy = shannon_entropy(row);
        weighted_sum += row_total * entropy;
        total_mass += row_total;
    }
    if total_mass > 0.0 {
        weighted_sum / total_mass
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CpuBackend;
    use rtinfluence_core::BaseEdge;

    #[test]
    fn single_community_spanning_all_vertices_has_ei_minus_one() {
        // Fully connected triangle -> one community, no between-community weight.
        let g = DirectedWeightedGraph::from_edges(&[
            BaseEdge { src: "A".into(), dst: "B".into(), weight: 1 },
            BaseEdge { src: "B".into(), dst: "C".into(), weight: 1 },
            BaseEdge { src: "C".into(), dst: "A".into(), weight: 1 },
        ]);
        let (m, errors) = compute_community_metrics(&g, &CpuBackend, "base", 42);
        assert!(errors.is_empty());
        assert_eq!(m["base__n_communities"], 1.0);
        assert_eq!(m["base__echo_EI_index_weighted"], -1.0);
        assert_eq!(m["base__largest_comm_share"], 1.0);
    }

    #[test]
    fn two_disjoint_triangles_have_zero_within_comm_weight_only() {
        let edges = vec![
            BaseEdge { src: "A".into(), dst: "B".into(), weight: 1 },
            BaseEdge { src: "B".into(), dst: "C".into(), weight: 1 },
            BaseEdge { src: "C".into(), dst: "A".into(), weight: 1 },
            BaseEdge { src: "D".into(), dst: "E".into(), weight: 1 },
            BaseEdge { src: "E".into(), dst: "F".into(), weight: 1 },
            BaseEdge { src: "F".into(), dst: "D".into(), weight: 1 },
        ];
        let g = DirectedWeightedGraph::from_edges(&edges);
        let (m, _) = compute_community_metrics(&g, &CpuBackend, "base", 1);
        assert_eq!(m["base__n_communities"], 2.0);
        assert_eq!(m["base__echo_between_comm_weight_share"], 0.0);
        assert_eq!(m["base__echo_EI_index_weighted"], -1.0);
    }

    #[test]
    fn empty_graph_yields_no_metrics() {
        let g = DirectedWeightedGraph::from_edges(&[]);
        let (m, errors) = compute_community_metrics(&g, &CpuBackend, "base", 1);
        assert!(m.is_empty());
        assert!(errors.is_empty());
    }
}
