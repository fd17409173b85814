//! Drives one `(company, start, end)` window end to end: load, build edges,
//! expand variants, compute graph/community/diffusion metrics, and validate.
//! This is the unit of work the orchestrator hands to a worker; it is
//! deliberately free of any queue/thread/process concerns of its own.

use std::collections::BTreeMap;

use rtinfluence_config::EngineConfig;
use rtinfluence_core::timebin::BinDuration;
use rtinfluence_core::{
    parse_variant_list, BaseEdge, Error, NodeTable, Result, Summary, ValidationReport, WindowTask,
};
use rtinfluence_graph::{compute_community_metrics, compute_variant_metrics, CpuBackend, DirectedWeightedGraph};

use crate::diffusion::compute_diffusion_metrics;
use crate::edge_builder::build_edges;
use crate::node_tables::build_node_table;
use crate::validator::validate_variant;
use crate::window_loader::{load_window, ColumnNames};

/// Everything a window produces: the summary row, per-variant validation
/// reports, named non-fatal algorithm errors, and the base (unfiltered)
/// weighted edges a Result Writer persists to `weighted_edges.parquet`.
#[derive(Debug, Clone)]
pub struct WindowOutcome {
    pub summary: Summary,
    pub validations: Vec<ValidationReport>,
    pub errors: Vec<(String, String)>,
    pub base_edges: Vec<BaseEdge>,
    /// Per-variant node tables, populated only when `save_node_tables` is set.
    pub node_tables: BTreeMap<String, NodeTable>,
    /// Set when the window hit an IO/Data-kind condition (currently: no
    /// events matched in the event store) — persisted as `errors.json`'s
    /// `fatal` flag. The window summary is still written either way.
    pub fatal: bool,
}

/// Run the full per-window pipeline for one task.
///
/// Errors returned here are fatal to the window (`Config`/`IoData`); a
/// capability failure during metrics computation is instead recorded as a
/// named, non-fatal entry in `WindowOutcome::errors` and never aborts the run.
pub fn run_window(
    task: &WindowTask,
    start_ns: i64,
    end_ns: i64,
    config: &EngineConfig,
) -> Result<WindowOutcome> {
    let columns = ColumnNames {
        src: config.src_col.clone(),
        dst: config.dst_col.clone(),
        timestamp: config.timestamp_col.clone(),
    };
    let events = load_window(&config.parquet_root, &task.company, start_ns, end_ns, &columns)?;

    let mut summary = Summary::new(
        task.company.clone(),
        task.window_id.clone(),
        task.start.clone(),
        task.end.clone(),
    );
    summary.variants = config.variants.clone();
    summary.diff_bin = config.diff_bin.clone();
    summary.growth_window_hours = config.growth_window_hours;
    summary.n_retweet_events = events.len() as u64;

    let mut all_errors: Vec<(String, String)> = Vec::new();
    let fatal = events.is_empty();
    if fatal {
        all_errors.push((
            "io_data".to_string(),
            "window matched no events in the event store".to_string(),
        ));
    }

    let build = build_edges(&events, config.drop_self_loops);
    summary.n_self_loops_removed = build.n_self_loops_removed;
    summary.extend(build.weight_stats.clone());

    let variants = parse_variant_list(&config.variants)?;
    let bin = BinDuration::parse(&config.diff_bin)?;
    let diffusion = compute_diffusion_metrics(&events, bin, config.growth_window_hours);
    summary.extend(diffusion.values.clone());

    let backend = CpuBackend;
    let mut validations = Vec::new();
    let mut node_tables = BTreeMap::new();

    for variant in &variants {
        let variant_edges = variant.apply(&build.edges);
        let g = DirectedWeightedGraph::from_edges(&variant_edges);
        let prefix = variant.name();

        let (metrics, errors) = compute_variant_metrics(&g, &backend, &prefix, config.extra_centrality);
        summary.extend(metrics.clone());
        all_errors.extend(errors);

        let (comm_metrics, comm_errors) = compute_community_metrics(&g, &backend, &prefix, 42);
        summary.extend(comm_metrics);
        all_errors.extend(comm_errors);

        let report = validate_variant(&prefix, &g, &metrics, config.validation_tol);
        if prefix == "base" {
            summary.base_validation_ok = Some(report.ok);
        }
        if config.fail_fast_window && !report.ok {
            return Err(Error::invariant(format!(
                "variant '{prefix}' failed validation for window '{}'",
                task.window_id
            )));
        }
        validations.push(report);

        if config.save_node_tables {
            let (table, table_errors) = build_node_table(&g, &backend, 42, config.extra_centrality);
            all_errors.extend(
                table_errors
                    .into_iter()
                    .map(|(name, msg)| (format!("{prefix}__node_table_{name}"), msg)),
            );
            node_tables.insert(prefix.clone(), table);
        }
    }

    let errors_for_output: Vec<(String, String)> = dedup_errors(all_errors);

    Ok(WindowOutcome {
        summary,
        validations,
        errors: errors_for_output,
        base_edges: build.edges,
        node_tables,
        fatal,
    })
}

fn dedup_errors(errors: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = BTreeMap::new();
    for (k, v) in errors {
        seen.entry(k).or_insert(v);
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn base_config() -> EngineConfig {
        EngineConfig {
            parquet_root: PathBuf::from("/nonexistent"),
            windows_file: PathBuf::from("/nonexistent/windows.csv"),
            outroot: PathBuf::from("/nonexistent/out"),
            ngpus: 1,
            queue_max: 100,
            src_col: "src".into(),
            dst_col: "dst".into(),
            timestamp_col: "ts".into(),
            drop_self_loops: false,
            skip_existing: false,
            max_tasks: 0,
            validation_tol: 1e-6,
            fail_fast_window: false,
            fail_fast_global: false,
            variants: "base,unweighted,thr2".into(),
            diff_bin: "10min".into(),
            growth_window_hours: 2.0,
            extra_centrality: false,
            save_node_tables: false,
        }
    }

    #[test]
    fn missing_event_store_yields_empty_window_not_error() {
        let task = WindowTask::new("ACME".into(), "2017-06-01 00:00:00".into(), "2017-06-30 23:59:59".into(), None);
        let outcome = run_window(
            &task,
            rtinfluence_core::timebin::parse_timestamp(&task.start).unwrap(),
            rtinfluence_core::timebin::parse_timestamp(&task.end).unwrap(),
            &base_config(),
        )
        .unwrap();
        assert_eq!(outcome.summary.n_retweet_events, 0);
        assert_eq!(outcome.validations.len(), 3);
        assert!(outcome.fatal);
        assert!(outcome.errors.iter().any(|(k, _)| k == "io_data"));
    }
}
