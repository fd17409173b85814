//! The Window Orchestrator: a bounded task queue feeding one worker thread
//! per accelerator, each running the full per-window pipeline and result
//! write, coordinated through a shared stop flag rather than a supervisor
//! that blocks on individual workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use rtinfluence_config::EngineConfig;
use rtinfluence_core::timebin::parse_timestamp;
use rtinfluence_core::WindowTask;
use rtinfluence_engine::run_window;
use rtinfluence_output::{window_output_dir, write_window_outputs};

/// One unit of work on the bounded queue. `Shutdown` is the sentinel a
/// worker sees once the producer has enqueued every window and closed the
/// channel end it's holding — workers also exit on a closed channel alone,
/// this variant exists so `fail_fast_global` can wake idle workers early.
enum QueueItem {
    Window(WindowTask),
    Shutdown,
}

/// Outcome of a single window's processing, collected by the orchestrator
/// for the final run report.
#[derive(Debug, Clone)]
pub struct WindowResult {
    pub window_id: String,
    pub company: String,
    pub ok: bool,
    pub skipped: bool,
    pub error: Option<String>,
}

/// Aggregate result of an orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<WindowResult>,
    pub stopped_early: bool,
}

impl RunReport {
    pub fn n_failed(&self) -> usize {
        self.results.iter().filter(|r| !r.ok && !r.skipped).count()
    }

    pub fn n_succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.ok).count()
    }
}

/// Runs every task in `tasks` through the per-window pipeline using
/// `config.ngpus` worker threads over a bounded queue of capacity
/// `config.queue_max`. Honors `skip_existing` (a window whose output
/// directory already has a `summary.json` is not reprocessed),
/// `max_tasks` (0 = unbounded), and `fail_fast_global` (the first fatal
/// window error sets a shared stop flag that both halts further enqueuing
/// and tells idle workers to drain and exit).
pub fn run_orchestrator(tasks: Vec<WindowTask>, config: Arc<EngineConfig>) -> RunReport {
    run_orchestrator_with_stop_flag(tasks, config, Arc::new(AtomicBool::new(false)))
}

/// Same as [`run_orchestrator`] but lets the caller supply the shared stop
/// flag, so an external signal handler (SIGINT/SIGTERM) can halt a run the
/// same way `fail_fast_global` does internally.
pub fn run_orchestrator_with_stop_flag(
    tasks: Vec<WindowTask>,
    config: Arc<EngineConfig>,
    stop_flag: Arc<AtomicBool>,
) -> RunReport {
    let (tx, rx): (Sender<QueueItem>, Receiver<QueueItem>) = bounded(config.queue_max.max(1));
    let results = Arc::new(Mutex::new(Vec::new()));

    let mut workers = Vec::with_capacity(config.ngpus);
    for worker_id in 0..config.ngpus.max(1) {
        let rx = rx.clone();
        let stop_flag = Arc::clone(&stop_flag);
        let results = Arc::clone(&results);
        let config = Arc::clone(&config);
        workers.push(std::thread::spawn(move || {
            worker_loop(worker_id, rx, stop_flag, results, config);
        }));
    }

    let max_tasks = config.max_tasks;
    let mut enqueued = 0usize;
    for task in tasks {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        if max_tasks > 0 && enqueued >= max_tasks {
            debug!(max_tasks, "max_tasks reached, stopping enqueue");
            break;
        }
        if config.skip_existing && window_already_done(&config, &task) {
            results.lock().unwrap().push(WindowResult {
                window_id: task.window_id.clone(),
                company: task.company.clone(),
                ok: true,
                skipped: true,
                error: None,
            });
            continue;
        }
        if tx.send(QueueItem::Window(task)).is_err() {
            break;
        }
        enqueued += 1;
    }
    for _ in 0..workers.len() {
        let _ = tx.send(QueueItem::Shutdown);
    }
    drop(tx);

    for w in workers {
        let _ = w.join();
    }

    let results = Arc::try_unwrap(results).unwrap().into_inner().unwrap();
    let stopped_early = stop_flag.load(Ordering::SeqCst);
    RunReport { results, stopped_early }
}

fn window_already_done(config: &EngineConfig, task: &WindowTask) -> bool {
    window_output_dir(&config.outroot, &task.company, &task.window_id)
        .join("summary.json")
        .exists()
}

fn worker_loop(
    worker_id: usize,
    rx: Receiver<QueueItem>,
    stop_flag: Arc<AtomicBool>,
    results: Arc<Mutex<Vec<WindowResult>>>,
    config: Arc<EngineConfig>,
) {
    info!(worker_id, "accelerator worker starting");
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        let item = match rx.recv() {
            Ok(item) => item,
            Err(_) => break,
        };
        let task = match item {
            QueueItem::Window(t) => t,
            QueueItem::Shutdown => break,
        };

        let window_id = task.window_id.clone();
        let company = task.company.clone();
        let result = process_one_window(worker_id, &task, &config);

        let (ok, error) = match result {
            Ok(()) => (true, None),
            Err(e) => {
                error!(worker_id, window_id = %window_id, error = %e, "window failed");
                if config.fail_fast_global {
                    warn!(worker_id, "fail_fast_global set, signalling stop");
                    stop_flag.store(true, Ordering::SeqCst);
                }
                (false, Some(e.to_string()))
            }
        };

        results.lock().unwrap().push(WindowResult { window_id, company, ok, skipped: false, error });
    }
    info!(worker_id, "accelerator worker exiting");
}

fn process_one_window(
    worker_id: usize,
    task: &WindowTask,
    config: &EngineConfig,
) -> rtinfluence_core::Result<()> {
    let start_ns = parse_timestamp(&task.start)?;
    let end_ns = parse_timestamp(&task.end)?;
    debug!(worker_id, window_id = %task.window_id, "processing window");

    let outcome = run_window(task, start_ns, end_ns, config)?;
    let dir = window_output_dir(&config.outroot, &task.company, &task.window_id);
    write_window_outputs(
        &dir,
        &outcome.summary,
        &outcome.errors,
        outcome.fatal,
        &outcome.validations,
        &outcome.base_edges,
        &outcome.node_tables,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(outroot: PathBuf) -> Arc<EngineConfig> {
        Arc::new(EngineConfig {
            parquet_root: PathBuf::from("/nonexistent"),
            windows_file: PathBuf::from("/nonexistent/windows.csv"),
            outroot,
            ngpus: 2,
            queue_max: 10,
            src_col: "src".into(),
            dst_col: "dst".into(),
            timestamp_col: "ts".into(),
            drop_self_loops: false,
            skip_existing: false,
            max_tasks: 0,
            validation_tol: 1e-6,
            fail_fast_window: false,
            fail_fast_global: false,
            variants: "base".into(),
            diff_bin: "10min".into(),
            growth_window_hours: 2.0,
            extra_centrality: false,
            save_node_tables: false,
        })
    }

    #[test]
    fn processes_every_task_against_an_empty_event_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let tasks = vec![
            WindowTask::new("ACME".into(), "2017-06-01 00:00:00".into(), "2017-06-30 23:59:59".into(), None),
            WindowTask::new("ACME".into(), "2017-07-01 00:00:00".into(), "2017-07-31 23:59:59".into(), None),
        ];
        let report = run_orchestrator(tasks, config);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.n_succeeded(), 2);
        assert!(!report.stopped_early);
    }

    #[test]
    fn skip_existing_avoids_reprocessing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = (*test_config(dir.path().to_path_buf())).clone();
        cfg.skip_existing = true;
        let config = Arc::new(cfg);

        let task = WindowTask::new("ACME".into(), "2017-06-01 00:00:00".into(), "2017-06-30 23:59:59".into(), None);
        std::fs::create_dir_all(window_output_dir(&config.outroot, &task.company, &task.window_id)).unwrap();
        std::fs::write(
            window_output_dir(&config.outroot, &task.company, &task.window_id).join("summary.json"),
            "{}",
        )
        .unwrap();

        let report = run_orchestrator(vec![task], config);
        assert_eq!(report.results.len(), 1);
        assert!(report.results[0].skipped);
    }
}
