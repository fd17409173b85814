//! Diffusion timing metrics: how quickly a window's events spread in time.

use std::collections::{BTreeMap, HashSet};

use rtinfluence_core::stats::ols_slope;
use rtinfluence_core::timebin::{floor_to_bin, window_anchor, BinDuration};
use rtinfluence_core::Event;

/// Diffusion timing metrics for one window's events, independent of variant
/// (diffusion is computed once on the raw event timestamps, not per-variant).
#[derive(Debug, Clone, Default)]
pub struct DiffusionMetrics {
    pub values: BTreeMap<String, f64>,
}

/// Compute diffusion timing metrics from a window's (already-filtered) events.
///
/// `bin` is the configured `diff_bin` duration: the adoption-curve quantiles
/// (`nodes/src/dst_t*`), `time_to_peak_hours`, and `post_peak_half_life_hours`
/// are all computed over counts binned at this width, floored relative to the
/// window's own earliest event (`floor_to_bin`) rather than the Unix epoch.
/// `growth_window_hours` bounds the early-growth OLS fit (`early_log_cum_events_slope`)
/// to events with `t_hours <= growth_window_hours`.
pub fn compute_diffusion_metrics(
    events: &[Event],
    bin: BinDuration,
    growth_window_hours: f64,
) -> DiffusionMetrics {
    let mut m = DiffusionMetrics::default();
    if events.is_empty() {
        return m;
    }

    let t0 = window_anchor(&events.iter().map(|e| e.ts).collect::<Vec<_>>()).unwrap();
    let mut hours: Vec<f64> = events.iter().map(|e| (e.ts - t0) as f64 / 3.6e12).collect();
    hours.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = hours.len();

    let percentile_hour = |frac: f64| -> f64 {
        let idx = ((frac * n as f64).ceil() as usize).saturating_sub(1).min(n - 1);
        hours[idx]
    };
    m.values.insert("t10_hours".into(), percentile_hour(0.10));
    m.values.insert("t50_hours".into(), percentile_hour(0.50));
    m.values.insert("t90_hours".into(), percentile_hour(0.90));

    let bin_index = |ts: i64| -> i64 {
        let floored = floor_to_bin(ts, t0, bin);
        let bin_ns = bin.seconds.max(1) * 1_000_000_000;
        (floored - t0) / bin_ns
    };
    let bin_hours = |idx: i64| -> f64 { idx as f64 * bin.seconds as f64 / 3600.0 };

    // Adoption quantiles: each id's first-appearance timestamp, binned by
    // `bin` and cumulated, locating the first bin whose cumulative count
    // reaches q * total.
    for (key, getter) in [
        ("src", &|e: &Event| e.src.clone()),
        ("dst", &|e: &Event| e.dst.clone()),
    ] as [(&str, &dyn Fn(&Event) -> String); 2]
    {
        let mut seen = HashSet::new();
        let mut first_seen_bins = Vec::new();
        let mut ev_sorted: Vec<&Event> = events.iter().collect();
        ev_sorted.sort_by_key(|e| e.ts);
        for e in &ev_sorted {
            let id = getter(e);
            if seen.insert(id) {
                first_seen_bins.push(bin_index(e.ts));
            }
        }
        insert_adoption_quantiles(&mut m.values, &format!("{key}_"), &first_seen_bins, &bin_hours);
    }
    {
        let mut seen = HashSet::new();
        let mut first_seen_bins = Vec::new();
        let mut ev_sorted: Vec<&Event> = events.iter().collect();
        ev_sorted.sort_by_key(|e| e.ts);
        for e in &ev_sorted {
            if seen.insert(e.src.clone()) {
                first_seen_bins.push(bin_index(e.ts));
            }
            if seen.insert(e.dst.clone()) {
                first_seen_bins.push(bin_index(e.ts));
            }
        }
        first_seen_bins.sort_unstable();
        insert_adoption_quantiles(&mut m.values, "nodes_", &first_seen_bins, &bin_hours);
    }

    // Time-to-peak and post-peak half-life over the event-count curve,
    // binned at the configured `diff_bin` width rather than a fixed hour.
    let mut counts_by_bin: BTreeMap<i64, u64> = BTreeMap::new();
    for e in events {
        *counts_by_bin.entry(bin_index(e.ts)).or_insert(0) += 1;
    }
    let (peak_bin, peak_count) = counts_by_bin
        .iter()
        .max_by_key(|(_, c)| **c)
        .map(|(b, c)| (*b, *c))
        .unwrap_or((0, 0));
    m.values.insert("time_to_peak_hours".into(), bin_hours(peak_bin));

    let max_bin = *counts_by_bin.keys().max().unwrap_or(&peak_bin);
    let half = peak_count as f64 / 2.0;
    let mut half_life = f64::NAN;
    for idx in (peak_bin + 1)..=max_bin {
        let count = counts_by_bin.get(&idx).copied().unwrap_or(0);
        if count as f64 <= half {
            half_life = bin_hours(idx) - bin_hours(peak_bin);
            break;
        }
    }
    m.values.insert("post_peak_half_life_hours".into(), half_life);

    // Early growth slope: OLS of log(cumulative events) on t_hours, restricted
    // to t_hours <= growth_window_hours.
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut cum = 0f64;
    for h in &hours {
        cum += 1.0;
        if *h <= growth_window_hours {
            xs.push(*h);
            ys.push(cum.ln());
        }
    }
    m.values.insert("early_log_cum_events_slope".into(), ols_slope(&xs, &ys));

    m
}

/// Inserts `<prefix>t10_hours`/`t50_hours`/`t90_hours` for an adoption curve
/// built from per-id first-appearance bin indices: cumulate in bin order and
/// locate the first bin whose cumulative count reaches `q * total`.
fn insert_adoption_quantiles(
    out: &mut BTreeMap<String, f64>,
    prefix: &str,
    first_seen_bins: &[i64],
    bin_hours: &dyn Fn(i64) -> f64,
) {
    let total = first_seen_bins.len();
    for (label, frac) in [("t10", 0.10), ("t50", 0.50), ("t90", 0.90)] {
        let v = if total == 0 {
            f64::NAN
        } else {
            let mut sorted = first_seen_bins.to_vec();
            sorted.sort_unstable();
            let mut cumulative = BTreeMap::new();
            let mut running = 0u64;
            for &b in &sorted {
                running += 1;
                cumulative.insert(b, running);
            }
            let threshold = frac * total as f64;
            cumulative
                .iter()
                .find(|(_, &count)| count as f64 >= threshold)
                .map(|(&bin, _)| bin_hours(bin))
                .unwrap_or(f64::NAN)
        };
        out.insert(format!("{prefix}{label}_hours"), v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(src: &str, dst: &str, ts: i64) -> Event {
        Event {
            company: "ACME".into(),
            src: src.into(),
            dst: dst.into(),
            ts,
        }
    }

    #[test]
    fn empty_events_yield_empty_metrics() {
        let bin = BinDuration::parse("10min").unwrap();
        let m = compute_diffusion_metrics(&[], bin, 2.0);
        assert!(m.values.is_empty());
    }

    #[test]
    fn single_event_has_zero_percentile_hours() {
        let bin = BinDuration::parse("10min").unwrap();
        let events = vec![ev("A", "B", 0)];
        let m = compute_diffusion_metrics(&events, bin, 2.0);
        assert_eq!(m.values["t50_hours"], 0.0);
        assert_eq!(m.values["nodes_t50_hours"], 0.0);
    }

    #[test]
    fn spread_out_events_have_increasing_percentiles() {
        let bin = BinDuration::parse("10min").unwrap();
        let hour_ns = 3_600_000_000_000i64;
        let events = vec![
            ev("A", "B", 0),
            ev("B", "C", hour_ns),
            ev("C", "D", 10 * hour_ns),
        ];
        let m = compute_diffusion_metrics(&events, bin, 2.0);
        assert!(m.values["t10_hours"] <= m.values["t50_hours"]);
        assert!(m.values["t50_hours"] <= m.values["t90_hours"]);
        assert!(m.values["nodes_t10_hours"] <= m.values["nodes_t50_hours"]);
        assert!(m.values["nodes_t50_hours"] <= m.values["nodes_t90_hours"]);
    }

    #[test]
    fn wider_bin_width_changes_time_to_peak_granularity() {
        let hour_ns = 3_600_000_000_000i64;
        let mut events = vec![ev("A", "B", 0), ev("A", "C", 0)];
        for i in 0..5 {
            events.push(ev("A", "D", i * (hour_ns / 10)));
        }
        let ten_min = BinDuration::parse("10min").unwrap();
        let one_hour = BinDuration::parse("1h").unwrap();
        let m_fine = compute_diffusion_metrics(&events, ten_min, 2.0);
        let m_coarse = compute_diffusion_metrics(&events, one_hour, 2.0);
        assert_eq!(m_coarse.values["time_to_peak_hours"], 0.0);
        assert!(m_fine.values.contains_key("time_to_peak_hours"));
    }
}
