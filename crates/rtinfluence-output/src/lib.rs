//! # rtinfluence-output
//!
//! The Result Writer: atomic JSON artifacts (`summary.json`, `errors.json`,
//! `validation.json`) plus columnar Parquet tables (`weighted_edges.parquet`
//! and optional per-variant node tables) for one window's output directory.

pub mod parquet_tables;
pub mod result_writer;

pub use parquet_tables::{write_node_table, write_table, write_weighted_edges, Column};
pub use result_writer::{window_output_dir, write_window_outputs};
