//! Descriptive statistics and concentration indices shared by the edge-weight,
//! strength, PageRank, and community-size/attention metric packs.
//!
//! Formulas follow the concentration definitions: Gini on ascending-sorted
//! nonnegative values, HHI/entropy/Theil on value shares, and top-k share on
//! `k = max(1, ceil(frac * n))` largest values.

use std::collections::BTreeMap;

/// `mean, std, min, max` plus quantiles at 25/50/75/90/95/99, each keyed
/// `<prefix>_<stat>`. Empty input yields all-NaN.
pub fn stats_pack(values: &[f64], prefix: &str) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    let v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    let n = v.len();
    out.insert(format!("{prefix}_mean"), mean(&v));
    out.insert(format!("{prefix}_std"), std_dev(&v));
    out.insert(
        format!("{prefix}_min"),
        if n == 0 { f64::NAN } else { v.iter().cloned().fold(f64::INFINITY, f64::min) },
    );
    out.insert(
        format!("{prefix}_max"),
        if n == 0 { f64::NAN } else { v.iter().cloned().fold(f64::NEG_INFINITY, f64::max) },
    );
    let mut sorted = v.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for q in [0.25, 0.5, 0.75, 0.9, 0.95, 0.99] {
        out.insert(format!("{prefix}_q{}", (q * 100.0).round() as i64), quantile(&sorted, q));
    }
    out
}

/// Gini/HHI/entropy/Theil/top-1/5/10%-share/max-share, each keyed `<prefix>_<name>`.
pub fn concentration_pack(values: &[f64], prefix: &str) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    let n = values.iter().filter(|x| !x.is_nan()).count();
    out.insert(format!("{prefix}_gini"), gini(values));
    out.insert(format!("{prefix}_hhi"), hhi(values));
    out.insert(format!("{prefix}_entropy"), shannon_entropy(values));
    out.insert(format!("{prefix}_theil"), theil(values));
    out.insert(format!("{prefix}_top1_share"), top_share(values, 0.01));
    out.insert(format!("{prefix}_top5_share"), top_share(values, 0.05));
    out.insert(format!("{prefix}_top10_share"), top_share(values, 0.10));
    out.insert(format!("{prefix}_max_share"), top_share(values, 1.0 / (n.max(1) as f64)));
    out
}

fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

fn std_dev(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return f64::NAN;
    }
    let m = mean(v);
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() as f64 - 1.0);
    var.sqrt()
}

/// Linear-interpolation quantile over an ascending-sorted slice (numpy's default rule).
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// `G = 2*sum(i*x_(i))/(n*S) - (n+1)/n` over ascending-sorted nonnegative values,
/// clamped to 0 when tiny-negative due to floating point.
pub fn gini(values: &[f64]) -> f64 {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan() && *x >= 0.0).collect();
    let n = v.len();
    if n == 0 {
        return f64::NAN;
    }
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let weighted: f64 = v.iter().enumerate().map(|(i, x)| (i as f64 + 1.0) * x).sum();
    let mut g = 2.0 * weighted / (n as f64 * total) - (n as f64 + 1.0) / n as f64;
    if g < 0.0 && g > -1e-12 {
        g = 0.0;
    }
    g
}

/// `sum((x_i/S)^2)`.
pub fn hhi(values: &[f64]) -> f64 {
    let v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return f64::NAN;
    }
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    v.iter().map(|x| (x / total).powi(2)).sum()
}

/// Shannon entropy `-sum(p_i * ln p_i)` over positive shares `p_i = x_i/S`.
pub fn shannon_entropy(values: &[f64]) -> f64 {
    let v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return f64::NAN;
    }
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return f64::NAN;
    }
    let shares: Vec<f64> = v.iter().map(|x| x / total).filter(|p| *p > 0.0).collect();
    if shares.is_empty() {
        return f64::NAN;
    }
    -shares.iter().map(|p| p * p.ln()).sum::<f64>()
}

/// Theil index `sum(p_i * ln(p_i * n))` over positive shares.
pub fn theil(values: &[f64]) -> f64 {
    let v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    let n = v.len();
    if n == 0 {
        return f64::NAN;
    }
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return f64::NAN;
    }
    let shares: Vec<f64> = v.iter().map(|x| x / total).filter(|p| *p > 0.0).collect();
    if shares.is_empty() {
        return f64::NAN;
    }
    shares.iter().map(|p| p * (p * n as f64).ln()).sum()
}

/// Sum of the largest `k = max(1, ceil(frac*n))` values divided by the total.
pub fn top_share(values: &[f64], frac: f64) -> f64 {
    let v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    let n = v.len();
    if n == 0 {
        return f64::NAN;
    }
    let total: f64 = v.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let k = ((frac * n as f64).ceil() as usize).max(1).min(n);
    let mut sorted = v.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
    sorted[..k].iter().sum::<f64>() / total
}

/// Freeman centralization: `sum(max - d_i) / ((n-1)(n-2))`, NaN for n<3.
pub fn freeman_centralization(degrees: &[f64]) -> f64 {
    let n = degrees.len();
    if n < 3 {
        return f64::NAN;
    }
    let dmax = degrees.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let num: f64 = degrees.iter().map(|d| dmax - d).sum();
    let denom = (n as f64 - 1.0) * (n as f64 - 2.0);
    if denom > 0.0 {
        num / denom
    } else {
        f64::NAN
    }
}

/// Ordinary least squares slope of `y` on `x`, NaN if fewer than 2 points or zero variance.
pub fn ols_slope(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let xm = mean(x);
    let ym = mean(y);
    let cov: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - xm) * (yi - ym)).sum::<f64>() / x.len() as f64;
    let var: f64 = x.iter().map(|xi| (xi - xm).powi(2)).sum::<f64>() / x.len() as f64;
    if var > 0.0 {
        cov / var
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gini_uniform_is_zero() {
        let v = vec![5.0, 5.0, 5.0, 5.0];
        assert!((gini(&v) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn gini_star_matches_scenario_s2() {
        // in_strength [10,10,10,10,0] -> gini 0.2; out_strength [40,0,0,0,0] -> gini 0.8
        let in_s = vec![10.0, 10.0, 10.0, 10.0, 0.0];
        let out_s = vec![40.0, 0.0, 0.0, 0.0, 0.0];
        assert!((gini(&in_s) - 0.2).abs() < 1e-9);
        assert!((gini(&out_s) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn hhi_single_value_is_one() {
        let v = vec![7.0];
        assert!((hhi(&v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn top_share_full_population_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((top_share(&v, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn freeman_centralization_star_graph() {
        // star of 5 nodes: degrees [4,1,1,1,1]
        let d = vec![4.0, 1.0, 1.0, 1.0, 1.0];
        let c = freeman_centralization(&d);
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn quantile_matches_simple_median() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn concentration_bounds_hold(xs in proptest::collection::vec(0.0f64..1000.0, 1..50)) {
            let g = gini(&xs);
            let h = hhi(&xs);
            if xs.iter().sum::<f64>() > 0.0 {
                proptest::prop_assert!(g >= -1e-9 && g <= 1.0 + 1e-9);
                proptest::prop_assert!(h >= 0.0 && h <= 1.0 + 1e-9);
            }
        }
    }
}
