//! CLI for the retweet-influence per-window graph engine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtinfluence_config::{validate_config, EngineConfig};
use rtinfluence_core::WindowTask;
use rtinfluence_runtime::run_orchestrator_with_stop_flag;

#[cfg(unix)]
use signal_hook::consts::{SIGINT, SIGTERM};

#[derive(Parser)]
#[command(name = "rtinfluence")]
#[command(about = "Per-window graph analytics engine for retweet influence networks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the window engine over a schedule of windows
    Run {
        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the hive-partitioned event store root
        #[arg(long)]
        parquet_root: Option<PathBuf>,

        /// Override the CSV windows schedule
        #[arg(long)]
        windows_file: Option<PathBuf>,

        /// Override the output directory root
        #[arg(long)]
        outroot: Option<PathBuf>,

        /// Override the number of accelerator workers
        #[arg(long)]
        ngpus: Option<usize>,

        /// Override max_tasks (0 = unbounded)
        #[arg(long)]
        max_tasks: Option<usize>,

        /// Skip windows whose output directory already has a summary.json
        #[arg(long)]
        skip_existing: bool,
    },

    /// Validate a configuration file without running anything
    ValidateConfig {
        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .init();

    match cli.command {
        Commands::Run {
            config,
            parquet_root,
            windows_file,
            outroot,
            ngpus,
            max_tasks,
            skip_existing,
        } => {
            let mut cfg = EngineConfig::from_yaml_file(&config)?;
            if let Some(p) = parquet_root {
                cfg.parquet_root = p;
            }
            if let Some(p) = windows_file {
                cfg.windows_file = p;
            }
            if let Some(p) = outroot {
                cfg.outroot = p;
            }
            if let Some(n) = ngpus {
                cfg.ngpus = n;
            }
            if let Some(m) = max_tasks {
                cfg.max_tasks = m;
            }
            if skip_existing {
                cfg.skip_existing = true;
            }

            let problems = validate_config(&cfg);
            if !problems.is_empty() {
                for p in &problems {
                    tracing::error!("config problem: {p}");
                }
                anyhow::bail!("configuration is invalid ({} problem(s))", problems.len());
            }

            let tasks = load_windows_csv(&cfg.windows_file)?;
            tracing::info!(
                n_windows = tasks.len(),
                ngpus = cfg.ngpus,
                queue_max = cfg.queue_max,
                "starting window run"
            );

            let stop_flag = Arc::new(AtomicBool::new(false));
            install_signal_handlers(Arc::clone(&stop_flag));

            let report = run_orchestrator_with_stop_flag(tasks, Arc::new(cfg), stop_flag);

            tracing::info!(
                n_succeeded = report.n_succeeded(),
                n_failed = report.n_failed(),
                stopped_early = report.stopped_early,
                "window run complete"
            );
            for r in &report.results {
                if !r.ok && !r.skipped {
                    tracing::warn!(
                        window_id = %r.window_id,
                        company = %r.company,
                        error = r.error.as_deref().unwrap_or("unknown"),
                        "window failed"
                    );
                }
            }

            if report.n_failed() > 0 {
                anyhow::bail!("{} window(s) failed", report.n_failed());
            }
            Ok(())
        }

        Commands::ValidateConfig { config } => {
            let cfg = EngineConfig::from_yaml_file(&config)?;
            let problems = validate_config(&cfg);
            if problems.is_empty() {
                tracing::info!("configuration is valid");
                Ok(())
            } else {
                for p in &problems {
                    println!("  - {p}");
                }
                anyhow::bail!("configuration is invalid ({} problem(s))", problems.len());
            }
        }
    }
}

/// Reads a `company,start,end,window_id?` schedule into tasks, deriving
/// `window_id` from `company`/`start`/`end` when the column is absent or
/// blank on a given row.
fn load_windows_csv(path: &Path) -> Result<Vec<WindowTask>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let window_id_col = headers.iter().position(|h| h == "window_id");

    let mut tasks = Vec::new();
    for record in reader.records() {
        let record = record?;
        let company = record
            .get(
                headers
                    .iter()
                    .position(|h| h == "company")
                    .ok_or_else(|| anyhow::anyhow!("windows file missing 'company' column"))?,
            )
            .unwrap_or_default()
            .to_string();
        let start = record
            .get(
                headers
                    .iter()
                    .position(|h| h == "start")
                    .ok_or_else(|| anyhow::anyhow!("windows file missing 'start' column"))?,
            )
            .unwrap_or_default()
            .to_string();
        let end = record
            .get(
                headers
                    .iter()
                    .position(|h| h == "end")
                    .ok_or_else(|| anyhow::anyhow!("windows file missing 'end' column"))?,
            )
            .unwrap_or_default()
            .to_string();
        let window_id = window_id_col
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        tasks.push(WindowTask::new(company, start, end, window_id));
    }
    Ok(tasks)
}

/// Registers SIGINT/SIGTERM handlers (Unix only) that flip `stop_flag`,
/// mirroring `fail_fast_global`'s cooperative shutdown: in-flight windows
/// finish, no new ones are dequeued.
#[cfg(unix)]
fn install_signal_handlers(stop_flag: Arc<AtomicBool>) {
    for sig in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(sig, Arc::clone(&stop_flag)) {
            tracing::warn!("failed to register signal handler for {sig}: {e}");
        }
    }
}

#[cfg(not(unix))]
fn install_signal_handlers(_stop_flag: Arc<AtomicBool>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_windows_with_and_without_explicit_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company,start,end,window_id").unwrap();
        writeln!(file, "ACME,2017-06-01 00:00:00,2017-06-30 23:59:59,custom-id").unwrap();
        writeln!(file, "ACME,2017-07-01 00:00:00,2017-07-31 23:59:59,").unwrap();
        file.flush().unwrap();

        let tasks = load_windows_csv(file.path()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].window_id, "custom-id");
        assert_ne!(tasks[1].window_id, "");
        assert_eq!(tasks[1].company, "ACME");
    }

    #[test]
    fn loads_windows_without_window_id_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company,start,end").unwrap();
        writeln!(file, "ACME,2017-06-01 00:00:00,2017-06-30 23:59:59").unwrap();
        file.flush().unwrap();

        let tasks = load_windows_csv(file.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks[0].window_id,
            WindowTask::derive_id("ACME", "2017-06-01 00:00:00", "2017-06-30 23:59:59")
        );
    }
}
