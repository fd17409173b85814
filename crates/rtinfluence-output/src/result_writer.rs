//! The Result Writer: persists one window's outputs to its output directory
//! — `summary.json`, `errors.json`, `validation.json`, `weighted_edges.parquet`,
//! and (when enabled) per-variant node tables — all via atomic writes so a
//! reader never observes a partially-written file.

use std::path::{Path, PathBuf};

use rtinfluence_core::{write_json_atomic, BaseEdge, NodeTable, Result, Summary, ValidationReport};

use crate::parquet_tables::{write_node_table, write_weighted_edges};

/// The output directory layout for one window: `<outroot>/<company>/<window_id>/`.
pub fn window_output_dir(outroot: &Path, company: &str, window_id: &str) -> PathBuf {
    outroot.join(company).join(window_id)
}

/// Write every output artifact for one window. `skip_existing` callers should
/// check `window_output_dir(...).join("summary.json").exists()` themselves
/// before invoking this — the writer always (re)writes when called.
pub fn write_window_outputs(
    dir: &Path,
    summary: &Summary,
    errors: &[(String, String)],
    fatal: bool,
    validations: &[ValidationReport],
    base_edges: &[BaseEdge],
    node_tables: &std::collections::BTreeMap<String, NodeTable>,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    write_json_atomic(&dir.join("summary.json"), &summary.to_json())?;

    let errors_json = serde_json::json!({
        "fatal": fatal,
        "named_errors": errors
            .iter()
            .map(|(k, v)| serde_json::json!({"name": k, "message": v}))
            .collect::<Vec<_>>(),
    });
    write_json_atomic(&dir.join("errors.json"), &errors_json)?;

    let validation_json = serde_json::json!(validations
        .iter()
        .map(|r| serde_json::json!({
            "variant": r.variant,
            "ok": r.ok,
            "checks": r.checks,
        }))
        .collect::<Vec<_>>());
    write_json_atomic(&dir.join("validation.json"), &validation_json)?;

    write_weighted_edges(&dir.join("weighted_edges.parquet"), base_edges)?;

    for (variant, table) in node_tables {
        write_node_table(&dir.join(format!("{variant}_nodes.parquet")), table)?;
    }

    Ok(())
}
