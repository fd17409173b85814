//! Weakly and strongly connected components.

use petgraph::graph::DiGraph;
use petgraph::unionfind::UnionFind;

use crate::graph::DirectedWeightedGraph;

/// Component label per vertex, via union-find over the undirected projection.
pub fn weakly_connected(g: &DirectedWeightedGraph) -> Vec<usize> {
    let mut uf = UnionFind::new(g.n.max(1));
    for u in 0..g.n {
        for &(v, _) in &g.out_adj[u] {
            uf.union(u, v);
        }
    }
    let reps: Vec<usize> = (0..g.n).map(|v| uf.find(v)).collect();
    relabel(&reps)
}

/// Component label per vertex via Tarjan's strongly connected components.
pub fn strongly_connected(g: &DirectedWeightedGraph) -> Vec<usize> {
    if g.n == 0 {
        return Vec::new();
    }
    let mut pg = DiGraph::<(), ()>::with_capacity(g.n, 0);
    let nodes: Vec<_> = (0..g.n).map(|_| pg.add_node(())).collect();
    for u in 0..g.n {
        for &(v, _) in &g.out_adj[u] {
            pg.add_edge(nodes[u], nodes[v], ());
        }
    }
    let sccs = petgraph::algo::tarjan_scc(&pg);
    let mut labels = vec![0usize; g.n];
    for (comp_id, comp) in sccs.iter().enumerate() {
        for &node in comp {
            labels[node.index()] = comp_id;
        }
    }
    labels
}

/// Renumber arbitrary labels to dense `0..k` ids in first-seen order.
fn relabel(raw: &[usize]) -> Vec<usize> {
    let mut map = std::collections::HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for &r in raw {
        let next = map.len();
        let id = *map.entry(r).or_insert(next);
        out.push(id);
    }
    out
}

/// Component sizes given a label-per-vertex assignment.
pub fn component_sizes(labels: &[usize]) -> Vec<usize> {
    let mut sizes = vec![0usize; labels.iter().copied().max().map(|m| m + 1).unwrap_or(0)];
    for &l in labels {
        sizes[l] += 1;
    }
    sizes
}
