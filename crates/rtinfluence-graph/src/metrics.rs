//! The Graph Metrics Engine: per-variant basic/strength/centralization/
//! reciprocity/component/PageRank/undirected-block metrics, all emitted
//! with a `<variant>__` key prefix.

use std::collections::BTreeMap;

use rtinfluence_core::stats::{concentration_pack, freeman_centralization, gini, shannon_entropy, stats_pack};

use crate::algo::{components, core_number, triangles};
use crate::capability::GraphCapability;
use crate::graph::DirectedWeightedGraph;

/// One named, non-fatal capability failure, reported in `errors.json` as
/// `<variant>__<capability>`.
pub type MetricErrors = Vec<(String, String)>;

/// Compute the full per-variant metrics pack for `g`, returning the flat
/// `<prefix>__<name>` metric map plus any named algorithm failures. Never
/// panics and never aborts early: a capability failure just omits its
/// metrics and records the failure.
pub fn compute_variant_metrics(
    g: &DirectedWeightedGraph,
    backend: &dyn GraphCapability,
    prefix: &str,
    extra_centrality: bool,
) -> (BTreeMap<String, f64>, MetricErrors) {
    let mut m = BTreeMap::new();
    let mut errors = MetricErrors::new();
    let key = |name: &str| format!("{prefix}__{name}");

    let n = g.n;
    let edges_unique = g.edges_unique();
    m.insert(key("n_nodes"), n as f64);
    m.insert(key("edges_unique"), edges_unique as f64);
    m.insert(key("total_weight"), g.total_weight);
    let density = if n > 1 {
        edges_unique as f64 / (n as f64 * (n as f64 - 1.0))
    } else {
        f64::NAN
    };
    m.insert(key("density"), density);

    if n == 0 {
        return (m, errors);
    }

    match backend.degree(g) {
        Ok(deg) => {
            add_strength_block(&mut m, &key, "in_strength", &deg.in_strength, g.total_weight);
            add_strength_block(&mut m, &key, "out_strength", &deg.out_strength, g.total_weight);
            let in_deg_f: Vec<f64> = deg.in_degree.iter().map(|&d| d as f64).collect();
            let out_deg_f: Vec<f64> = deg.out_degree.iter().map(|&d| d as f64).collect();
            m.insert(key("in_degree_centralization"), freeman_centralization(&in_deg_f));
            m.insert(key("out_degree_centralization"), freeman_centralization(&out_deg_f));
        }
        Err(e) => errors.push((key("degree"), e.to_string())),
    }

    m.insert(key("reciprocity"), reciprocity(g));

    match backend.weakly_cc(g) {
        Ok(labels) => add_component_block(&mut m, &key, "wcc", &labels),
        Err(e) => errors.push((key("weakly_cc"), e.to_string())),
    }
    match backend.strongly_cc(g) {
        Ok(labels) => add_component_block(&mut m, &key, "scc", &labels),
        Err(e) => errors.push((key("strongly_cc"), e.to_string())),
    }

    match backend.pagerank(g) {
        Ok(pr) => {
            m.extend(stats_pack(&pr, &key("pagerank")));
            m.extend(concentration_pack(&pr, &key("pagerank")));
            m.insert(key("pagerank_sum"), pr.iter().sum());
        }
        Err(e) => errors.push((key("pagerank"), e.to_string())),
    }

    let undirected_adj = g.undirected_neighbors();
    match backend.core_number(g) {
        Ok(core) => {
            let (max_core, buckets) = core_number::core_size_buckets(&core);
            m.insert(key("max_core"), max_core as f64);
            for (k, count) in buckets {
                m.insert(key(&format!("core_size_k{k}")), count as f64);
            }
        }
        Err(e) => errors.push((key("core_number"), e.to_string())),
    }
    match backend.triangle_count_per_vertex(g) {
        Ok(t) => {
            let total_tri = triangles::total_triangles(&t);
            m.insert(key("total_triangles"), total_tri as f64);
            m.insert(key("transitivity"), triangles::transitivity(&undirected_adj, total_tri));
            m.insert(key("avg_clustering"), triangles::avg_clustering(&undirected_adj, &t));
            m.insert(key("leaf_share_undirected"), triangles::leaf_share(&undirected_adj));
        }
        Err(e) => errors.push((key("triangle_count_per_vertex"), e.to_string())),
    }

    if extra_centrality {
        match backend.eigenvector(g) {
            Ok(v) => {
                m.insert(key("eigenvector_gini"), gini(&v));
                m.insert(key("eigenvector_hhi"), concentration_pack(&v, "x")["x_hhi"]);
            }
            Err(e) => errors.push((key("eigenvector"), e.to_string())),
        }
        match backend.betweenness(g) {
            Ok(v) => {
                m.insert(key("betweenness_gini"), gini(&v));
                m.insert(key("betweenness_hhi"), concentration_pack(&v, "x")["x_hhi"]);
            }
            Err(e) => errors.push((key("betweenness"), e.to_string())),
        }
        match backend.closeness(g) {
            Ok(v) => {
                m.insert(key("closeness_gini"), gini(&v));
                m.insert(key("closeness_hhi"), concentration_pack(&v, "x")["x_hhi"]);
            }
            Err(e) => errors.push((key("closeness"), e.to_string())),
        }
    }

    (m, errors)
}

fn add_strength_block(
    m: &mut BTreeMap<String, f64>,
    key: &impl Fn(&str) -> String,
    name: &str,
    values: &[f64],
    total_weight: f64,
) {
    m.extend(stats_pack(values, &key(name)));
    m.extend(concentration_pack(values, &key(name)));
    let zero_share = if values.is_empty() {
        f64::NAN
    } else {
        values.iter().filter(|&&v| v == 0.0).count() as f64 / values.len() as f64
    };
    m.insert(key(&format!("{name}_zero_share" )), zero_share);
    let sum: f64 = values.iter().sum();
    m.insert(key(&format!("check_sum_{}_minus_total", name.trim_end_matches("_strength"))), sum - total_weight);
}

fn add_component_block(m: &mut BTreeMap<String, f64>, key: &impl Fn(&str) -> String, name: &str, labels: &[usize]) {
    let sizes = components::component_sizes(labels);
    let sizes_f: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();
    let total: f64 = sizes_f.iter().sum();
    m.insert(key(&format!("n_{name}")), sizes.len() as f64);
    let largest = sizes_f.iter().cloned().fold(0.0, f64::max);
    m.insert(key(&format!("largest_{name}_share")), if total > 0.0 { largest / total } else { f64::NAN });
    m.insert(key(&format!("{name}_size_hhi")), concentration_pack(&sizes_f, "x")["x_hhi"]);
    m.insert(key(&format!("{name}_size_gini")), gini(&sizes_f));
    m.insert(key(&format!("{name}_size_entropy")), shannon_entropy(&sizes_f));
    if name == "wcc" {
        m.insert(key("wcc_top5_share"), rtinfluence_core::stats::top_share(&sizes_f, 0.05));
    }
}

/// `|{(u,v): edge(u,v) and edge(v,u)}| / edges_unique`.
fn reciprocity(g: &DirectedWeightedGraph) -> f64 {
    if g.edges_unique() == 0 {
        return f64::NAN;
    }
    let mut present: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
    for u in 0..g.n {
        for &(v, _) in &g.out_adj[u] {
            present.insert((u, v));
        }
    }
    let mutual = present.iter().filter(|&&(u, v)| present.contains(&(v, u))).count();
    mutual as f64 / present.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CpuBackend;
    use rtinfluence_core::BaseEdge;

    #[test]
    fn star_scenario_matches_s2_shape() {
        // A -> {B,C,D,E}, 10 each.
        let edges = ["B", "C", "D", "E"]
            .iter()
            .map(|d| BaseEdge { src: "A".into(), dst: (*d).into(), weight: 10 })
            .collect::<Vec<_>>();
        let g = DirectedWeightedGraph::from_edges(&edges);
        let (m, errors) = compute_variant_metrics(&g, &CpuBackend, "base", false);
        assert!(errors.is_empty());
        assert_eq!(m["base__n_nodes"], 5.0);
        assert_eq!(m["base__total_weight"], 40.0);
        assert_eq!(m["base__reciprocity"], 0.0);
    }

    #[test]
    fn empty_graph_has_zero_nodes_and_no_errors() {
        let g = DirectedWeightedGraph::from_edges(&[]);
        let (m, errors) = compute_variant_metrics(&g, &CpuBackend, "base", false);
        assert_eq!(m["base__n_nodes"], 0.0);
        assert!(errors.is_empty());
        assert_eq!(m.len(), 4); // n_nodes, edges_unique, total_weight, density only
    }

    #[test]
    fn mutual_pair_has_full_reciprocity() {
        let g = DirectedWeightedGraph::from_edges(&[
            BaseEdge { src: "A".into(), dst: "B".into(), weight: 1 },
            BaseEdge { src: "B".into(), dst: "A".into(), weight: 1 },
        ]);
        let (m, _) = compute_variant_metrics(&g, &CpuBackend, "base", false);
        assert_eq!(m["base__reciprocity"], 1.0);
    }
}
