//! # rtinfluence-config
//!
//! CLI-surface configuration schema and validation for the per-window
//! graph-analytics engine: the typed `EngineConfig` that a `--config`
//! YAML file and CLI flags both populate, and its `validate()` pass.

pub mod schema;
pub mod validation;

pub use schema::*;
pub use validation::*;
