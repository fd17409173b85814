//! End-to-end checks of `run_window` against the worked scenarios: a real
//! hive-partitioned temp event store in, a full `WindowOutcome` out.

use rtinfluence_config::EngineConfig;
use rtinfluence_core::timebin::parse_timestamp;
use rtinfluence_core::WindowTask;
use rtinfluence_engine::run_window;
use rtinfluence_test_utils::{scenario_s1_chain, scenario_s2_star, write_event_store};

fn config(parquet_root: std::path::PathBuf) -> EngineConfig {
    config_with_variants(parquet_root, "base")
}

fn config_with_variants(parquet_root: std::path::PathBuf, variants: &str) -> EngineConfig {
    EngineConfig {
        parquet_root,
        windows_file: "/nonexistent/windows.csv".into(),
        outroot: "/nonexistent/out".into(),
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
        variants: variants.into(),
        diff_bin: "10min".into(),
        growth_window_hours: 2.0,
        extra_centrality: false,
        save_node_tables: false,
    }
}

/// S1: three events `(A->B, A->B, B->C)` in 30 minutes.
#[test]
fn s1_chain_reconciles_edges_and_passes_validation() {
    let root = tempfile::tempdir().unwrap();
    let events = scenario_s1_chain("ACME");
    write_event_store(root.path(), "ACME", &events, "src", "dst", "ts").unwrap();

    let task = WindowTask::new(
        "ACME".into(),
        "2017-06-01 00:00:00".into(),
        "2017-06-01 01:00:00".into(),
        None,
    );
    let start_ns = parse_timestamp(&task.start).unwrap();
    let end_ns = parse_timestamp(&task.end).unwrap();
    let outcome = run_window(&task, start_ns, end_ns, &config(root.path().to_path_buf())).unwrap();

    assert_eq!(outcome.summary.n_retweet_events, 3);
    assert!(!outcome.fatal);
    assert_eq!(outcome.base_edges.len(), 2);
    let a_to_b = outcome.base_edges.iter().find(|e| e.src == "A" && e.dst == "B").unwrap();
    assert_eq!(a_to_b.weight, 2);
    let b_to_c = outcome.base_edges.iter().find(|e| e.src == "B" && e.dst == "C").unwrap();
    assert_eq!(b_to_c.weight, 1);

    assert_eq!(outcome.summary.metrics["base__n_nodes"], 3.0);
    assert_eq!(outcome.summary.metrics["base__total_weight"], 3.0);
    assert!((outcome.summary.metrics["base__density"] - (2.0 / 6.0)).abs() < 1e-9);
    assert_eq!(outcome.summary.metrics["base__reciprocity"], 0.0);
    assert_eq!(outcome.summary.metrics["base__n_wcc"], 1.0);

    assert_eq!(outcome.validations.len(), 1);
    assert!(outcome.validations[0].ok, "checks: {:?}", outcome.validations[0].checks);
    assert_eq!(outcome.summary.base_validation_ok, Some(true));
}

/// S2: pure star, ten events each to four leaves (40 total). PageRank mass
/// should sum to ~1 and the in-degree imbalance (A has 0 in-strength, every
/// leaf has 10) should drive a nonzero in/out-strength Gini.
#[test]
fn s2_star_has_expected_edge_count_and_pagerank_mass() {
    let root = tempfile::tempdir().unwrap();
    let events = scenario_s2_star("ACME");
    write_event_store(root.path(), "ACME", &events, "src", "dst", "ts").unwrap();

    let task = WindowTask::new(
        "ACME".into(),
        "2017-06-01 00:00:00".into(),
        "2017-06-01 06:00:00".into(),
        None,
    );
    let start_ns = parse_timestamp(&task.start).unwrap();
    let end_ns = parse_timestamp(&task.end).unwrap();
    let outcome = run_window(&task, start_ns, end_ns, &config(root.path().to_path_buf())).unwrap();

    assert_eq!(outcome.summary.n_retweet_events, 40);
    assert_eq!(outcome.base_edges.len(), 4);
    assert_eq!(outcome.summary.metrics["base__total_weight"], 40.0);
    assert!((outcome.summary.metrics["base__pagerank_sum"] - 1.0).abs() < 0.05);
}

/// S4: `thr2` variant applied to S1. S1's edges are `{A->B:2, B->C:1}`; the
/// threshold-2 filter drops `B->C`, leaving just `{A->B:2}`.
#[test]
fn s4_thr2_variant_keeps_only_the_weight_two_edge() {
    let root = tempfile::tempdir().unwrap();
    let events = scenario_s1_chain("ACME");
    write_event_store(root.path(), "ACME", &events, "src", "dst", "ts").unwrap();

    let task = WindowTask::new(
        "ACME".into(),
        "2017-06-01 00:00:00".into(),
        "2017-06-01 01:00:00".into(),
        None,
    );
    let start_ns = parse_timestamp(&task.start).unwrap();
    let end_ns = parse_timestamp(&task.end).unwrap();
    let outcome = run_window(
        &task,
        start_ns,
        end_ns,
        &config_with_variants(root.path().to_path_buf(), "base,thr2"),
    )
    .unwrap();

    assert_eq!(outcome.summary.metrics["thr2__n_nodes"], 2.0);
    assert_eq!(outcome.summary.metrics["thr2__edges_unique"], 1.0);
    assert_eq!(outcome.summary.metrics["thr2__total_weight"], 2.0);
    assert!((outcome.summary.metrics["thr2__density"] - 0.5).abs() < 1e-9);

    // base is unaffected by the thr2 filter being present.
    assert_eq!(outcome.summary.metrics["base__n_nodes"], 3.0);
    assert_eq!(outcome.summary.metrics["base__edges_unique"], 2.0);
}
