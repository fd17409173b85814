//! Cross-checks a variant's computed metrics against the edges they were
//! derived from, catching silent arithmetic drift in the capability layer.

use rtinfluence_core::ValidationReport;
use rtinfluence_graph::DirectedWeightedGraph;

/// Run the fixed checks for one variant's metrics against its graph, returning
/// a report with every check recorded (not just the first failure) so a
/// caller can decide fail-fast policy on top of a complete picture.
pub fn validate_variant(
    variant: &str,
    g: &DirectedWeightedGraph,
    metrics: &std::collections::BTreeMap<String, f64>,
    tol: f64,
) -> ValidationReport {
    let mut report = ValidationReport::new(variant);
    let key = |name: &str| format!("{variant}__{name}");

    let in_strength_total: f64 = (0..g.n).map(|v| g.in_strength(v)).sum();
    let out_strength_total: f64 = (0..g.n).map(|v| g.out_strength(v)).sum();

    let sum_in_ok = (in_strength_total - g.total_weight).abs() <= tol;
    report.check(
        "sum_in_matches_total",
        sum_in_ok,
        Some(serde_json::json!({"in_strength_total": in_strength_total, "total_weight": g.total_weight})),
    );

    let sum_out_ok = (out_strength_total - g.total_weight).abs() <= tol;
    report.check(
        "sum_out_matches_total",
        sum_out_ok,
        Some(serde_json::json!({"out_strength_total": out_strength_total, "total_weight": g.total_weight})),
    );

    if let Some(&density) = metrics.get(&key("density")) {
        let density_ok = density.is_nan() || (0.0..=1.0).contains(&density);
        report.check("density_in_0_1", density_ok, Some(serde_json::json!({"density": density})));
    }

    if let Some(&pr_sum) = metrics.get(&key("pagerank_sum")) {
        let pagerank_ok = (pr_sum - 1.0).abs() <= tol.max(0.05);
        report.check("pagerank_sum_near_1", pagerank_ok, Some(serde_json::json!({"pagerank_sum": pr_sum})));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtinfluence_core::BaseEdge;

    #[test]
    fn reconciled_star_graph_passes_all_checks() {
        let edges = ["B", "C", "D"]
            .iter()
            .map(|d| BaseEdge { src: "A".into(), dst: (*d).into(), weight: 10 })
            .collect::<Vec<_>>();
        let g = DirectedWeightedGraph::from_edges(&edges);
        let (metrics, _) =
            rtinfluence_graph::compute_variant_metrics(&g, &rtinfluence_graph::CpuBackend, "base", false);
        let report = validate_variant("base", &g, &metrics, 1e-6);
        assert!(report.ok, "checks: {:?}", report.checks);
    }

    #[test]
    fn empty_graph_reports_no_fatal_imbalance() {
        let g = DirectedWeightedGraph::from_edges(&[]);
        let report = validate_variant("base", &g, &std::collections::BTreeMap::new(), 1e-6);
        assert!(report.checks.get("sum_in_matches_total").unwrap().ok);
    }
}
