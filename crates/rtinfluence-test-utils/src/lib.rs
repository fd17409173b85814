//! Fixtures and temp-parquet helpers shared by the engine/runtime/cli test
//! suites: the six worked scenarios, and a writer that lays events out in
//! the hive-partitioned `company=/year=/month=` layout the window loader
//! expects.

use std::path::{Path, PathBuf};

use chrono::Datelike;

use rtinfluence_core::models::Event;
use rtinfluence_core::timebin::parse_timestamp;
use rtinfluence_core::Result;
use rtinfluence_output::Column;

/// Parses an `"YYYY-MM-DD HH:MM:SS"` string into nanoseconds since epoch.
pub fn ts(s: &str) -> i64 {
    parse_timestamp(s).expect("fixture timestamp must parse")
}

/// S1: three events `(A->B, A->B, B->C)` within 30 minutes.
pub fn scenario_s1_chain(company: &str) -> Vec<Event> {
    vec![
        Event { company: company.into(), src: "A".into(), dst: "B".into(), ts: ts("2017-06-01 00:00:00") },
        Event { company: company.into(), src: "A".into(), dst: "B".into(), ts: ts("2017-06-01 00:15:00") },
        Event { company: company.into(), src: "B".into(), dst: "C".into(), ts: ts("2017-06-01 00:30:00") },
    ]
}

/// S2: pure star `A -> {B,C,D,E}`, ten events each (40 total), evenly spread
/// over four hours so diffusion percentiles are non-degenerate.
pub fn scenario_s2_star(company: &str) -> Vec<Event> {
    let leaves = ["B", "C", "D", "E"];
    let mut events = Vec::with_capacity(40);
    let base = ts("2017-06-01 00:00:00");
    for (leaf_idx, leaf) in leaves.iter().enumerate() {
        for i in 0..10 {
            let minute = (leaf_idx * 10 + i) as i64 * 6;
            events.push(Event {
                company: company.into(),
                src: "A".into(),
                dst: (*leaf).into(),
                ts: base + minute * 60_000_000_000,
            });
        }
    }
    events
}

/// S3: two disconnected triangles, 6 nodes / 6 unique edges.
pub fn scenario_s3_two_triangles(company: &str) -> Vec<Event> {
    let base = ts("2017-06-01 00:00:00");
    let minute = 60_000_000_000i64;
    let pairs = [
        ("A", "B"),
        ("B", "C"),
        ("C", "A"),
        ("D", "E"),
        ("E", "F"),
        ("F", "D"),
    ];
    pairs
        .iter()
        .enumerate()
        .map(|(i, (src, dst))| Event {
            company: company.into(),
            src: (*src).into(),
            dst: (*dst).into(),
            ts: base + i as i64 * minute,
        })
        .collect()
}

/// S5: a handful of events including one at 23:45, meant to be queried with
/// a date-only midnight window end (`2017-06-30`) so end-of-day
/// normalization is exercised by the caller.
pub fn scenario_s5_late_day_events(company: &str) -> Vec<Event> {
    vec![
        Event { company: company.into(), src: "A".into(), dst: "B".into(), ts: ts("2017-06-30 09:00:00") },
        Event { company: company.into(), src: "A".into(), dst: "B".into(), ts: ts("2017-06-30 23:45:00") },
    ]
}

/// Writes `events` into `root` as `company=<C>/year=<Y>/month=<M>/data.parquet`,
/// grouping by the UTC year/month of each event's timestamp. `src_col`,
/// `dst_col`, and `timestamp_col` name the written columns, matching
/// whatever an `EngineConfig` under test expects.
pub fn write_event_store(
    root: &Path,
    company: &str,
    events: &[Event],
    src_col: &str,
    dst_col: &str,
    timestamp_col: &str,
) -> Result<()> {
    use std::collections::BTreeMap;

    let mut buckets: BTreeMap<(i32, u32), Vec<&Event>> = BTreeMap::new();
    for event in events {
        let secs = event.ts.div_euclid(1_000_000_000);
        let nanos = event.ts.rem_euclid(1_000_000_000) as u32;
        let dt = chrono::DateTime::from_timestamp(secs, nanos)
            .expect("fixture timestamp must be representable");
        buckets.entry((dt.year(), dt.month())).or_default().push(event);
    }

    for ((year, month), bucket) in buckets {
        let dir: PathBuf = root
            .join(format!("company={company}"))
            .join(format!("year={year}"))
            .join(format!("month={month}"));
        std::fs::create_dir_all(&dir)?;

        let src: Vec<String> = bucket.iter().map(|e| e.src.clone()).collect();
        let dst: Vec<String> = bucket.iter().map(|e| e.dst.clone()).collect();
        let timestamps: Vec<i64> = bucket.iter().map(|e| e.ts).collect();

        rtinfluence_output::write_table(
            &dir.join("data.parquet"),
            vec![
                (src_col, Column::Str(src)),
                (dst_col, Column::Str(dst)),
                (timestamp_col, Column::Int(timestamps)),
            ],
        )?;
    }
    Ok(())
}
