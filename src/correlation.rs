//! Correlation Engine: Pearson correlation (with significance via
//! Student's t) on aligned numeric reservoir samples, plus Spearman and
//! Kendall's tau-b. A pure function over already-collected samples; no
//! internal mutable state.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::accumulator::ColumnAccumulator;
use crate::config::ProfilerConfig;
use crate::types::{CorrelationMethod, CorrelationResult, CorrelationStrength};

fn strength_of(r: f64) -> CorrelationStrength {
    let abs = r.abs();
    if abs >= 0.9 {
        CorrelationStrength::VeryStrong
    } else if abs >= 0.7 {
        CorrelationStrength::Strong
    } else {
        CorrelationStrength::Moderate
    }
}

/// Pairs up two reservoirs row-by-row, right-padding the shorter with NaN,
/// then drops any row where either side is NaN before computing the
/// coefficient. The padding only walks both reservoirs to a common length;
/// NaN never participates in the statistic itself.
fn aligned_pairs(a: &[f64], b: &[f64]) -> Vec<(f64, f64)> {
    let len = a.len().max(b.len());
    (0..len)
        .filter_map(|i| {
            let x = a.get(i).copied().unwrap_or(f64::NAN);
            let y = b.get(i).copied().unwrap_or(f64::NAN);
            if x.is_finite() && y.is_finite() {
                Some((x, y))
            } else {
                None
            }
        })
        .collect()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n_f;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn p_value_for_r(r: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let df = (n - 2) as f64;
    let denom = (1.0 - r * r).max(1e-12);
    let t_stat = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(t_stat.abs()));
    Some(p.clamp(0.0, 1.0))
}

fn ranks(values: &[f64]) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
    let mut rank = vec![0.0; values.len()];
    let mut i = 0;
    while i < idx.len() {
        let mut j = i;
        while j + 1 < idx.len() && values[idx[j + 1]] == values[idx[i]] {
            j += 1;
        }
        let avg_rank = ((i + j) as f64 / 2.0) + 1.0;
        for k in idx.iter().take(j + 1).skip(i) {
            rank[*k] = avg_rank;
        }
        i = j + 1;
    }
    rank
}

fn spearman(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
    let rank_pairs: Vec<(f64, f64)> = ranks(&xs).into_iter().zip(ranks(&ys)).collect();
    pearson(&rank_pairs)
}

/// Kendall's tau-b, with the standard tie correction. O(n^2) pairwise
/// comparisons; `pairs` is bounded by the numeric reservoir capacity, not
/// the full column.
fn kendall(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    let mut ties_x: i64 = 0;
    let mut ties_y: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = pairs[i].0 - pairs[j].0;
            let dy = pairs[i].1 - pairs[j].1;
            if dx == 0.0 && dy == 0.0 {
                continue;
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if dx.signum() == dy.signum() {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    let denom = ((concordant + discordant + ties_x) as f64 * (concordant + discordant + ties_y) as f64).sqrt();
    if denom <= 0.0 {
        return None;
    }
    Some((concordant - discordant) as f64 / denom)
}

/// Two-sided p-value for Kendall's tau via the standard normal
/// approximation to its sampling distribution.
fn p_value_for_kendall(tau: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let n_f = n as f64;
    let variance = 2.0 * (2.0 * n_f + 5.0) / (9.0 * n_f * (n_f - 1.0));
    if variance <= 0.0 {
        return None;
    }
    let z = tau / variance.sqrt();
    let dist = Normal::new(0.0, 1.0).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(z.abs()));
    Some(p.clamp(0.0, 1.0))
}

fn canonical_order(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Computes Pearson, Spearman, and Kendall's tau-b across every
/// numeric-column pair, deduplicating to the strongest |r| per canonical
/// pair. A pair is emitted once its coefficient clears
/// `config.correlation_threshold`; the p-value is reported but never
/// gates emission.
pub fn compute_all(numeric_columns: &[(&str, &ColumnAccumulator)], config: &ProfilerConfig) -> Vec<CorrelationResult> {
    let columns: Vec<&(&str, &ColumnAccumulator)> = numeric_columns.iter().take(config.max_correlation_columns).collect();

    let mut by_pair: std::collections::HashMap<(String, String), CorrelationResult> = std::collections::HashMap::new();

    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            let (name_a, acc_a) = columns[i];
            let (name_b, acc_b) = columns[j];
            let pairs = aligned_pairs(acc_a.numeric_reservoir.items(), acc_b.numeric_reservoir.items());
            let Some(r) = pearson(&pairs) else { continue };
            if !r.is_finite() || r.abs() <= config.correlation_threshold {
                continue;
            }
            let p = p_value_for_r(r, pairs.len());
            let (c1, c2) = canonical_order(name_a, name_b);
            let candidate = CorrelationResult {
                column1: c1.clone(),
                column2: c2.clone(),
                coefficient: r,
                method: CorrelationMethod::Pearson,
                strength: strength_of(r),
                p_value: p,
                sample_size: pairs.len(),
            };
            upsert_strongest(&mut by_pair, (c1, c2), candidate);

            if let Some(rho) = spearman(&pairs) {
                if rho.is_finite() && rho.abs() > config.correlation_threshold {
                    let (c1, c2) = canonical_order(name_a, name_b);
                    let candidate = CorrelationResult {
                        column1: c1.clone(),
                        column2: c2.clone(),
                        coefficient: rho,
                        method: CorrelationMethod::Spearman,
                        strength: strength_of(rho),
                        p_value: p_value_for_r(rho, pairs.len()),
                        sample_size: pairs.len(),
                    };
                    upsert_strongest(&mut by_pair, (c1, c2), candidate);
                }
            }

            if let Some(tau) = kendall(&pairs) {
                if tau.is_finite() && tau.abs() > config.correlation_threshold {
                    let (c1, c2) = canonical_order(name_a, name_b);
                    let candidate = CorrelationResult {
                        column1: c1.clone(),
                        column2: c2.clone(),
                        coefficient: tau,
                        method: CorrelationMethod::Kendall,
                        strength: strength_of(tau),
                        p_value: p_value_for_kendall(tau, pairs.len()),
                        sample_size: pairs.len(),
                    };
                    upsert_strongest(&mut by_pair, (c1, c2), candidate);
                }
            }
        }
    }

    let mut results: Vec<CorrelationResult> = by_pair.into_values().collect();
    results.sort_by(|a, b| {
        b.coefficient
            .abs()
            .partial_cmp(&a.coefficient.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

fn upsert_strongest(
    map: &mut std::collections::HashMap<(String, String), CorrelationResult>,
    key: (String, String),
    candidate: CorrelationResult,
) {
    map.entry(key)
        .and_modify(|existing| {
            if candidate.coefficient.abs() > existing.coefficient.abs() {
                *existing = candidate.clone();
            }
        })
        .or_insert(candidate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfilerConfig;
    use crate::source::ColumnView;
    use crate::types::InferredType;

    fn column_with_values(name: &str, values: &[f64]) -> ColumnAccumulator {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new(name, 0, Some(InferredType::Float), &cfg);
        let strings: Vec<Option<String>> = values.iter().map(|v| Some(v.to_string())).collect();
        acc.process_chunk(&ColumnView::Strings(strings), &cfg);
        acc
    }

    #[test]
    fn perfectly_correlated_columns_hit_very_strong() {
        let cfg = ProfilerConfig::default();
        let xs: Vec<f64> = (0..40).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * 2.0).collect();
        let a = column_with_values("x", &xs);
        let b = column_with_values("y", &ys);
        let results = compute_all(&[("x", &a), ("y", &b)], &cfg);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].strength, CorrelationStrength::VeryStrong);
        assert!(results[0].coefficient > 0.99);
    }

    #[test]
    fn canonical_pair_ordering_is_lexicographic() {
        let cfg = ProfilerConfig::default();
        let xs: Vec<f64> = (0..40).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * 3.0).collect();
        let a = column_with_values("zeta", &xs);
        let b = column_with_values("alpha", &ys);
        let results = compute_all(&[("zeta", &a), ("alpha", &b)], &cfg);
        assert_eq!(results[0].column1, "alpha");
        assert_eq!(results[0].column2, "zeta");
    }

    #[test]
    fn uncorrelated_columns_produce_no_result() {
        let cfg = ProfilerConfig::default();
        let xs: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ys: Vec<f64> = vec![5.0, 1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0];
        let a = column_with_values("x", &xs);
        let b = column_with_values("y", &ys);
        let results = compute_all(&[("x", &a), ("y", &b)], &cfg);
        assert!(results.is_empty());
    }

    #[test]
    fn kendall_tau_is_perfect_for_strictly_increasing_pairs() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (f64::from(i), f64::from(i))).collect();
        let tau = kendall(&pairs).unwrap();
        assert!((tau - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kendall_tau_is_reversed_for_strictly_decreasing_pairs() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (f64::from(i), -f64::from(i))).collect();
        let tau = kendall(&pairs).unwrap();
        assert!((tau + 1.0).abs() < 1e-9);
    }

    #[test]
    fn kendall_tau_applies_tie_correction() {
        let pairs = vec![(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (3.0, 3.0)];
        let tau = kendall(&pairs).unwrap();
        assert!(tau > 0.0 && tau <= 1.0);
    }

    #[test]
    fn kendall_surfaces_a_monotonic_relationship_pearson_undervalues() {
        let cfg = ProfilerConfig::default();
        let xs: Vec<f64> = (1..=30).map(f64::from).collect();
        // Strictly increasing but with a single magnitude spike: rank order
        // is preserved (tau stays 1) while Pearson's r is pulled down by it.
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| if i == 15 { 10_000.0 } else { *x })
            .collect();
        let a = column_with_values("x", &xs);
        let b = column_with_values("y", &ys);
        let results = compute_all(&[("x", &a), ("y", &b)], &cfg);
        assert!(results.iter().any(|r| r.method == CorrelationMethod::Kendall));
    }
}
