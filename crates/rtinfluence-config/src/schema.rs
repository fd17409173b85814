//! Typed configuration populated by `clap` flags and/or an optional
//! `--config <file>.yaml` file loaded first and then overridden by flags,
//! matching the source codebase's CLI-over-config-file layering.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_ngpus() -> usize {
    8
}
fn default_queue_max() -> usize {
    20_000
}
fn default_src_col() -> String {
    "src".to_string()
}
fn default_dst_col() -> String {
    "dst".to_string()
}
fn default_timestamp_col() -> String {
    "ts".to_string()
}
fn default_validation_tol() -> f64 {
    1e-6
}
fn default_variants() -> String {
    "base,unweighted,thr2".to_string()
}
fn default_diff_bin() -> String {
    "10min".to_string()
}
fn default_growth_window_hours() -> f64 {
    2.0
}

/// The full recognized configuration surface, §6 EXTERNAL INTERFACES.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root of the hive-partitioned event store (`company=/year=/month=`).
    pub parquet_root: PathBuf,
    /// CSV schedule with header `company,start,end,window_id?`.
    pub windows_file: PathBuf,
    /// Root directory under which per-window output directories are created.
    pub outroot: PathBuf,

    /// Number of accelerator workers (OS threads in this implementation, one
    /// per logical accelerator as in the source deployment).
    #[serde(default = "default_ngpus")]
    pub ngpus: usize,
    /// Bounded task queue capacity.
    #[serde(default = "default_queue_max")]
    pub queue_max: usize,

    #[serde(default = "default_src_col")]
    pub src_col: String,
    #[serde(default = "default_dst_col")]
    pub dst_col: String,
    #[serde(default = "default_timestamp_col")]
    pub timestamp_col: String,

    #[serde(default)]
    pub drop_self_loops: bool,
    #[serde(default)]
    pub skip_existing: bool,
    /// 0 means unbounded.
    #[serde(default)]
    pub max_tasks: usize,

    #[serde(default = "default_validation_tol")]
    pub validation_tol: f64,
    #[serde(default)]
    pub fail_fast_window: bool,
    #[serde(default)]
    pub fail_fast_global: bool,

    #[serde(default = "default_variants")]
    pub variants: String,
    #[serde(default = "default_diff_bin")]
    pub diff_bin: String,
    #[serde(default = "default_growth_window_hours")]
    pub growth_window_hours: f64,

    #[serde(default)]
    pub extra_centrality: bool,
    #[serde(default)]
    pub save_node_tables: bool,
}

impl EngineConfig {
    /// Load a YAML config file as the base layer; callers then apply CLI
    /// flag overrides on top of the returned value.
    pub fn from_yaml_file(path: &std::path::Path) -> rtinfluence_core::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| rtinfluence_core::Error::config(format!("invalid config file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_external_interface_spec() {
        let yaml = "parquet_root: /data\nwindows_file: /data/windows.csv\noutroot: /out\n";
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ngpus, 8);
        assert_eq!(cfg.queue_max, 20_000);
        assert_eq!(cfg.src_col, "src");
        assert_eq!(cfg.dst_col, "dst");
        assert_eq!(cfg.timestamp_col, "ts");
        assert_eq!(cfg.max_tasks, 0);
        assert!((cfg.validation_tol - 1e-6).abs() < 1e-15);
        assert_eq!(cfg.variants, "base,unweighted,thr2");
        assert_eq!(cfg.diff_bin, "10min");
        assert!((cfg.growth_window_hours - 2.0).abs() < 1e-12);
    }
}
