//! The graph capability trait and its two backends.
//!
//! `CpuBackend` is the implementation used throughout this repository, built
//! on `petgraph`'s connected-components/SCC primitives plus hand-written
//! PageRank, Louvain, k-core, triangle-count, and (optional) heavy
//! centrality routines where `petgraph` has no equivalent. `GpuBackend` is a
//! typed placeholder: every method returns a named, non-fatal `Algorithm`
//! error, since a device-bound implementation is out of scope here.

use rtinfluence_core::{Error, Result};

use crate::algo::{centrality, components, core_number, louvain, pagerank, triangles};
use crate::graph::DirectedWeightedGraph;

/// Per-vertex in/out degree (unweighted) and strength (weighted).
#[derive(Debug, Clone)]
pub struct DegreeReport {
    pub in_degree: Vec<usize>,
    pub out_degree: Vec<usize>,
    pub in_strength: Vec<f64>,
    pub out_strength: Vec<f64>,
}

/// Minimum operations consumed by the graph metrics and community/echo
/// engines. Each call is independently fallible so a single missing or
/// unavailable capability never aborts the rest of the metrics pack.
pub trait GraphCapability {
    fn degree(&self, g: &DirectedWeightedGraph) -> Result<DegreeReport>;
    fn weakly_cc(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>>;
    fn strongly_cc(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>>;
    fn pagerank(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>>;
    fn core_number(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>>;
    fn triangle_count_per_vertex(&self, g: &DirectedWeightedGraph) -> Result<Vec<u64>>;
    fn louvain(&self, g: &DirectedWeightedGraph, seed: u64) -> Result<louvain::LouvainResult>;
    fn eigenvector(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>>;
    fn betweenness(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>>;
    fn closeness(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>>;
}

/// The reference CPU implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl GraphCapability for CpuBackend {
    fn degree(&self, g: &DirectedWeightedGraph) -> Result<DegreeReport> {
        Ok(DegreeReport {
            in_degree: (0..g.n).map(|v| g.in_degree(v)).collect(),
            out_degree: (0..g.n).map(|v| g.out_degree(v)).collect(),
            in_strength: (0..g.n).map(|v| g.in_strength(v)).collect(),
            out_strength: (0..g.n).map(|v| g.out_strength(v)).collect(),
        })
    }

    fn weakly_cc(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Ok(components::weakly_connected(g))
    }

    fn strongly_cc(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Ok(components::strongly_connected(g))
    }

    fn pagerank(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        pagerank::pagerank(g)
    }

    fn core_number(&self, g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Ok(core_number::core_numbers(&g.undirected_neighbors()))
    }

    fn triangle_count_per_vertex(&self, g: &DirectedWeightedGraph) -> Result<Vec<u64>> {
        Ok(triangles::triangle_count_per_vertex(&g.undirected_neighbors()))
    }

    fn louvain(&self, g: &DirectedWeightedGraph, seed: u64) -> Result<louvain::LouvainResult> {
        let adj = undirected_weighted(g);
        Ok(louvain::louvain(&adj, louvain::LouvainConfig { seed, ..Default::default() }))
    }

    fn eigenvector(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        centrality::eigenvector(&g.undirected_neighbors())
    }

    fn betweenness(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Ok(centrality::betweenness(&g.undirected_neighbors()))
    }

    fn closeness(&self, g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Ok(centrality::closeness(&g.undirected_neighbors()))
    }
}

/// Symmetrized weighted adjacency (out-edges folded onto their reverse so
/// Louvain sees an undirected weighted graph), self-loops excluded.
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

/// A typed placeholder for a device-bound backend. Every operation is
/// unavailable in this build; callers see a named, non-fatal `Algorithm`
/// error and continue with the metric omitted or NaN, per the error
/// handling policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpuBackend;

impl GpuBackend {
    fn unavailable(name: &str) -> Error {
        Error::algorithm(name, "GPU backend is not available in this build")
    }
}

impl GraphCapability for GpuBackend {
    fn degree(&self, _g: &DirectedWeightedGraph) -> Result<DegreeReport> {
        Err(Self::unavailable("degree"))
    }
    fn weakly_cc(&self, _g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Err(Self::unavailable("weakly_cc"))
    }
    fn strongly_cc(&self, _g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Err(Self::unavailable("strongly_cc"))
    }
    fn pagerank(&self, _g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Err(Self::unavailable("pagerank"))
    }
    fn core_number(&self, _g: &DirectedWeightedGraph) -> Result<Vec<usize>> {
        Err(Self::unavailable("core_number"))
    }
    fn triangle_count_per_vertex(&self, _g: &DirectedWeightedGraph) -> Result<Vec<u64>> {
        Err(Self::unavailable("triangle_count_per_vertex"))
    }
    fn louvain(&self, _g: &DirectedWeightedGraph, _seed: u64) -> Result<louvain::LouvainResult> {
        Err(Self::unavailable("louvain"))
    }
    fn eigenvector(&self, _g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Err(Self::unavailable("eigenvector"))
    }
    fn betweenness(&self, _g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Err(Self::unavailable("betweenness"))
    }
    fn closeness(&self, _g: &DirectedWeightedGraph) -> Result<Vec<f64>> {
        Err(Self::unavailable("closeness"))
    }
}
