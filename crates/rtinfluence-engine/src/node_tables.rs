//! Builds the optional per-variant node table (`save_node_tables`): one row
//! per factorized vertex with its pagerank, community, core number, triangle
//! count, strength/degree, and (when enabled) heavy centrality scores.

use rtinfluence_core::NodeTable;
use rtinfluence_graph::{DirectedWeightedGraph, GraphCapability};

/// Non-fatal capability failures encountered while building the table,
/// recorded the same way the Graph Metrics Engine does.
pub type NodeTableErrors = Vec<(String, String)>;

pub fn build_node_table(
    g: &DirectedWeightedGraph,
    backend: &dyn GraphCapability,
    seed: u64,
    extra_centrality: bool,
) -> (NodeTable, NodeTableErrors) {
    let mut errors = NodeTableErrors::new();
    let mut table = NodeTable {
        node: g.factorization.labels.clone(),
        ..Default::default()
    };
    let n = g.n;

    match backend.degree(g) {
        Ok(deg) => {
            table.in_strength = deg.in_strength;
            table.out_strength = deg.out_strength;
            table.in_degree = deg.in_degree.iter().map(|&d| d as i64).collect();
            table.out_degree = deg.out_degree.iter().map(|&d| d as i64).collect();
        }
        Err(e) => {
            errors.push(("degree".to_string(), e.to_string()));
            table.in_strength = vec![f64::NAN; n];
            table.out_strength = vec![f64::NAN; n];
            table.in_degree = vec![0; n];
            table.out_degree = vec![0; n];
        }
    }

    match backend.pagerank(g) {
        Ok(pr) => table.pagerank = pr,
        Err(e) => {
            errors.push(("pagerank".to_string(), e.to_string()));
            table.pagerank = vec![f64::NAN; n];
        }
    }

    match backend.louvain(g, seed) {
        Ok(r) => table.community = r.communities.iter().map(|&c| c as i64).collect(),
        Err(e) => {
            errors.push(("louvain".to_string(), e.to_string()));
            table.community = vec![-1; n];
        }
    }

    match backend.core_number(g) {
        Ok(core) => table.core_number = core.iter().map(|&c| c as i64).collect(),
        Err(e) => {
            errors.push(("core_number".to_string(), e.to_string()));
            table.core_number = vec![-1; n];
        }
    }

    match backend.triangle_count_per_vertex(g) {
        Ok(t) => table.triangles = t.iter().map(|&c| c as i64).collect(),
        Err(e) => {
            errors.push(("triangle_count_per_vertex".to_string(), e.to_string()));
            table.triangles = vec![-1; n];
        }
    }

    if extra_centrality {
        table.eigenvector = backend.eigenvector(g).ok();
        table.betweenness = backend.betweenness(g).ok();
        table.closeness = backend.closeness(g).ok();
    }

    (table, errors)
}
