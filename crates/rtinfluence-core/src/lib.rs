//! # rtinfluence-core
//!
//! Core domain models, the error taxonomy, and statistics primitives shared by every
//! stage of the per-window graph-analytics engine.
//!
//! This crate provides the foundational types used throughout the pipeline:
//! - Event/edge/variant domain models and window identifiers
//! - The summary/validation report value bags written by the Result Writer
//! - The error taxonomy (Config/IoData/Algorithm/Invariant/System)
//! - Statistics primitives: descriptive stats packs and concentration indices
//! - Deterministic time binning for the Diffusion Analyzer
//! - The `Sink` trait and an atomic JSON write helper

pub mod error;
pub mod models;
pub mod sink;
pub mod stats;
pub mod timebin;

pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use sink::{write_json_atomic, Sink};
