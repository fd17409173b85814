//! Configuration validation: collects every structural problem into a `Vec`
//! of messages rather than failing on the first one found.

use rtinfluence_core::parse_variant_list;

use crate::schema::EngineConfig;

/// Validate an `EngineConfig`, returning every problem found (empty on success).
pub fn validate_config(config: &EngineConfig) -> Vec<String> {
    let mut problems = Vec::new();
    validate_paths(config, &mut problems);
    validate_concurrency(config, &mut problems);
    validate_columns(config, &mut problems);
    validate_variants(config, &mut problems);
    validate_diff_bin(config, &mut problems);
    validate_thresholds(config, &mut problems);
    problems
}

fn validate_paths(config: &EngineConfig, problems: &mut Vec<String>) {
    if config.parquet_root.as_os_str().is_empty() {
        problems.push("parquet_root must not be empty".to_string());
    }
    if config.windows_file.as_os_str().is_empty() {
        problems.push("windows_file must not be empty".to_string());
    }
    if config.outroot.as_os_str().is_empty() {
        problems.push("outroot must not be empty".to_string());
    }
}

fn validate_concurrency(config: &EngineConfig, problems: &mut Vec<String>) {
    if config.ngpus == 0 {
        problems.push("ngpus must be at least 1".to_string());
    }
    if config.queue_max == 0 {
        problems.push("queue_max must be greater than 0".to_string());
    }
}

fn validate_columns(config: &EngineConfig, problems: &mut Vec<String>) {
    for (name, value) in [
        ("src_col", &config.src_col),
        ("dst_col", &config.dst_col),
        ("timestamp_col", &config.timestamp_col),
    ] {
        if value.trim().is_empty() {
            problems.push(format!("{name} must not be empty"));
        }
    }
}

fn validate_variants(config: &EngineConfig, problems: &mut Vec<String>) {
    if let Err(e) = parse_variant_list(&config.variants) {
        problems.push(format!("invalid variants list '{}': {e}", config.variants));
    }
}

fn validate_diff_bin(config: &EngineConfig, problems: &mut Vec<String>) {
    if let Err(e) = rtinfluence_core::timebin::BinDuration::parse(&config.diff_bin) {
        problems.push(format!("invalid diff_bin '{}': {e}", config.diff_bin));
    }
}

fn validate_thresholds(config: &EngineConfig, problems: &mut Vec<String>) {
    if config.validation_tol < 0.0 {
        problems.push("validation_tol must be non-negative".to_string());
    }
    if config.growth_window_hours <= 0.0 {
        problems.push("growth_window_hours must be positive".to_string());
    }
}
