//! # rtinfluence-engine
//!
//! The per-window pipeline: Window Loader, Edge Builder, variant expansion,
//! Diffusion Analyzer, and Validator. Everything here runs once per
//! `(company, start, end)` task handed to it by the orchestrator; it knows
//! nothing about queues, workers, or process boundaries.

pub mod diffusion;
pub mod edge_builder;
pub mod node_tables;
pub mod pipeline;
pub mod validator;
pub mod window_loader;

pub use diffusion::{compute_diffusion_metrics, DiffusionMetrics};
pub use edge_builder::{build_edges, EdgeBuildResult};
pub use node_tables::build_node_table;
pub use pipeline::{run_window, WindowOutcome};
pub use validator::validate_variant;
pub use window_loader::{load_window, ColumnNames};
