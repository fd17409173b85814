//! # rtinfluence-runtime
//!
//! The Window Orchestrator: a bounded task queue, one worker thread per
//! accelerator, and the shared stop-flag coordination that lets
//! `fail_fast_global` halt a run without any worker blocking on another.

pub mod orchestrator;

pub use orchestrator::{run_orchestrator, run_orchestrator_with_stop_flag, RunReport, WindowResult};
