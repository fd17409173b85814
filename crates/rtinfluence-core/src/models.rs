//! Domain models shared across the window pipeline: events, edges, variants,
//! window identifiers, and the summary/validation value bags persisted by the
//! Result Writer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single retweet event, scoped to one window.
///
/// `ts` is nanoseconds since the Unix epoch, matching the Arrow `Timestamp(ns)`
/// column read from the event store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub company: String,
    pub src: String,
    pub dst: String,
    pub ts: i64,
}

/// A weighted directed edge derived from events by `(src, dst)` group-count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEdge {
    pub src: String,
    pub dst: String,
    pub weight: i64,
}

/// A weight-definition variant rule applied to `BaseEdge`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Identity: the base weighted edge counts.
    Base,
    /// Every retained edge has weight rewritten to 1.
    Unweighted,
    /// Retain only edges with `weight >= k`.
    ThrK(i64),
}

impl Variant {
    /// The `<variant>__` prefix used for every summary key this variant emits.
    pub fn name(&self) -> String {
        match self {
            Variant::Base => "base".to_string(),
            Variant::Unweighted => "unweighted".to_string(),
            Variant::ThrK(k) => format!("thr{k}"),
        }
    }

    /// Parse a variant name as it appears in the `variants` CLI flag.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        match s {
            "base" => Ok(Variant::Base),
            "unweighted" => Ok(Variant::Unweighted),
            _ if s.starts_with("thr") => {
                let k: i64 = s[3..]
                    .parse()
                    .map_err(|_| crate::Error::config(format!("invalid variant '{s}'")))?;
                if k < 1 {
                    return Err(crate::Error::config(format!(
                        "variant '{s}' must have threshold >= 1"
                    )));
                }
                Ok(Variant::ThrK(k))
            }
            _ => Err(crate::Error::config(format!("unknown variant '{s}'"))),
        }
    }

    /// Apply this variant's rule to a base edge set.
    pub fn apply(&self, base: &[BaseEdge]) -> Vec<BaseEdge> {
        match self {
            Variant::Base => base.to_vec(),
            Variant::Unweighted => base
                .iter()
                .map(|e| BaseEdge {
                    src: e.src.clone(),
                    dst: e.dst.clone(),
                    weight: 1,
                })
                .collect(),
            Variant::ThrK(k) => base.iter().filter(|e| e.weight >= *k).cloned().collect(),
        }
    }
}

/// Parse the `variants` CLI flag, a comma-separated list, prepending `base` if absent.
pub fn parse_variant_list(csv: &str) -> crate::Result<Vec<Variant>> {
    let mut out: Vec<Variant> = Vec::new();
    let mut has_base = false;
    for tok in csv.split(',') {
        let tok = tok.trim();
        if tok.is_empty() {
            continue;
        }
        let v = Variant::parse(tok)?;
        if matches!(v, Variant::Base) {
            has_base = true;
        }
        out.push(v);
    }
    if !has_base {
        out.insert(0, Variant::Base);
    }
    Ok(out)
}

/// A `(company, start, end)` window to process, as read from the schedule CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTask {
    pub company: String,
    pub start: String,
    pub end: String,
    pub window_id: String,
}

impl WindowTask {
    /// Derive a deterministic `window_id` when the schedule row left it blank:
    /// `<company>_<startToken>_<endToken>` with whitespace and colons stripped.
    pub fn derive_id(company: &str, start: &str, end: &str) -> String {
        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace() && *c != ':').collect::<String>();
        format!("{company}_{}_{}", strip(start), strip(end))
    }

    pub fn new(company: String, start: String, end: String, window_id: Option<String>) -> Self {
        let window_id =
            window_id.filter(|s| !s.is_empty()).unwrap_or_else(|| Self::derive_id(&company, &start, &end));
        Self {
            company,
            start,
            end,
            window_id,
        }
    }
}

/// The flat metric-name -> scalar map produced per window, plus identifying fields.
///
/// Per the data model, variant metrics are stored with a `<variant>__` prefix
/// directly in `metrics` rather than as nested structures; `flatten_to_json`
/// is the single place that turns this into the `summary.json` document.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub company: String,
    pub window_id: String,
    pub start_time: String,
    pub end_time: String,
    pub variants: String,
    pub diff_bin: String,
    pub growth_window_hours: f64,
    pub n_retweet_events: u64,
    pub n_self_loops_removed: u64,
    pub base_validation_ok: Option<bool>,
    pub metrics: BTreeMap<String, f64>,
}

impl Summary {
    pub fn new(company: String, window_id: String, start_time: String, end_time: String) -> Self {
        Self {
            company,
            window_id,
            start_time,
            end_time,
            ..Default::default()
        }
    }

    /// Insert a metric value. NaN/infinite values are kept; they are rendered as
    /// JSON `null` at write time (strict JSON has no NaN literal).
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = (String, f64)>) {
        self.metrics.extend(values);
    }

    /// Flatten identifiers and metrics into a single JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("company".into(), self.company.clone().into());
        map.insert("window_id".into(), self.window_id.clone().into());
        map.insert("start_time".into(), self.start_time.clone().into());
        map.insert("end_time".into(), self.end_time.clone().into());
        map.insert("variants".into(), self.variants.clone().into());
        map.insert("diff_bin".into(), self.diff_bin.clone().into());
        map.insert("growth_window_hours".into(), json_number(self.growth_window_hours));
        map.insert("n_retweet_events".into(), self.n_retweet_events.into());
        map.insert("n_self_loops_removed".into(), self.n_self_loops_removed.into());
        if let Some(ok) = self.base_validation_ok {
            map.insert("base_validation_ok".into(), ok.into());
        }
        for (k, v) in &self.metrics {
            map.insert(k.clone(), json_number(*v));
        }
        serde_json::Value::Object(map)
    }
}

/// Render an `f64` as a JSON number, falling back to `null` for NaN/infinite values
/// (strict JSON cannot represent either).
pub fn json_number(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// A per-vertex node table for one variant, written to a
/// `<variant>_nodes.parquet` table when `save_node_tables` is enabled.
/// Optional heavy-centrality columns are `None` when `extra_centrality` is off
/// or the capability failed.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    pub node: Vec<String>,
    pub pagerank: Vec<f64>,
    pub community: Vec<i64>,
    pub core_number: Vec<i64>,
    pub triangles: Vec<i64>,
    pub in_strength: Vec<f64>,
    pub out_strength: Vec<f64>,
    pub in_degree: Vec<i64>,
    pub out_degree: Vec<i64>,
    pub eigenvector: Option<Vec<f64>>,
    pub betweenness: Option<Vec<f64>>,
    pub closeness: Option<Vec<f64>>,
}

/// One named check within a `ValidationReport`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Per-variant validator output: named checks plus an aggregate `ok`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub variant: String,
    pub checks: BTreeMap<String, ValidationCheck>,
    pub ok: bool,
}

impl ValidationReport {
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            checks: BTreeMap::new(),
            ok: true,
        }
    }

    pub fn check(&mut self, name: impl Into<String>, ok: bool, details: Option<serde_json::Value>) {
        if !ok {
            self.ok = false;
        }
        self.checks.insert(name.into(), ValidationCheck { ok, details });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parsing() {
        assert_eq!(Variant::parse("base").unwrap(), Variant::Base);
        assert_eq!(Variant::parse("unweighted").unwrap(), Variant::Unweighted);
        assert_eq!(Variant::parse("thr2").unwrap(), Variant::ThrK(2));
        assert!(Variant::parse("thr0").is_err());
        assert!(Variant::parse("bogus").is_err());
    }

    #[test]
    fn variant_list_prepends_base() {
        let vs = parse_variant_list("unweighted,thr2").unwrap();
        assert_eq!(vs[0], Variant::Base);
        assert_eq!(vs.len(), 3);
    }

    #[test]
    fn window_id_derivation_strips_whitespace_and_colons() {
        let id = WindowTask::derive_id("ACME", "2017-06-01 00:00:00", "2017-06-30 23:59:59");
        assert_eq!(id, "ACME_2017-06-01000000_2017-06-30235959");
        assert!(!id.contains(' ') && !id.contains(':'));
    }

    #[test]
    fn thr_variant_filters_by_weight() {
        let base = vec![
            BaseEdge { src: "A".into(), dst: "B".into(), weight: 2 },
            BaseEdge { src: "B".into(), dst: "C".into(), weight: 1 },
        ];
        let filtered = Variant::ThrK(2).apply(&base);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].weight, 2);
    }
}
