//! # rtinfluence-graph
//!
//! The graph capability layer, the Graph Metrics Engine, and the Community &
//! Echo Engine: everything that turns a variant's weighted edge set into the
//! `<variant>__*` metric map written to `summary.json`.

pub mod algo;
pub mod capability;
pub mod community;
pub mod graph;
pub mod metrics;

pub use capability::{CpuBackend, DegreeReport, GpuBackend, GraphCapability};
pub use community::compute_community_metrics;
pub use graph::{DirectedWeightedGraph, Factorization};
pub use metrics::compute_variant_metrics;
