//! Context Discovery & Contextual Validator: detects categorical→numeric
//! subgroup patterns (variance-explained) and linear correlations between
//! numeric columns, then uses them to reclassify anomaly candidates that
//! context can explain.
//!
//! Row-level joins require rows to be aligned across columns, which the
//! per-column accumulators alone cannot provide once values have been
//! reservoir-sampled independently per column. This component therefore
//! works off a small bounded cross-column row sample (`RowSampleStore`,
//! capped the same way `sample_values` is capped per column) captured
//! during the first chunk, rather than against the unbounded stream.

use std::collections::HashMap;

use crate::config::ProfilerConfig;
use crate::types::{CorrelationPattern, OutlierExplanation, ContextValidationResult, SegmentStats, SubgroupPattern};

/// A bounded table of raw row values captured during the first chunk,
/// one column per entry, used only by context discovery.
#[derive(Debug, Clone, Default)]
pub struct RowSampleStore {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    capacity: usize,
}

impl RowSampleStore {
    pub fn new(column_names: Vec<String>, capacity: usize) -> Self {
        Self {
            column_names,
            rows: Vec::new(),
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        if !self.is_full() {
            self.rows.push(row);
        }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    fn string_values(&self, name: &str) -> Vec<Option<&str>> {
        let Some(idx) = self.column_index(name) else { return Vec::new() };
        self.rows.iter().map(|r| r.get(idx).and_then(|v| v.as_deref())).collect()
    }

    fn numeric_values(&self, name: &str) -> Vec<Option<f64>> {
        self.string_values(name)
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect()
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    (mean, var.sqrt())
}

fn quartile(sorted: &[f64], pct: f64) -> f64 {
    crate::sampling::percentile(sorted, pct)
}

/// R² = 1 - SS_within / SS_total across segments of `categorical_col`.
fn variance_explained(
    segment_values: &[(&str, f64)],
    config: &ProfilerConfig,
) -> Option<(f64, Vec<SegmentStats>)> {
    if segment_values.len() < 20 {
        return None;
    }
    let mut by_segment: HashMap<&str, Vec<f64>> = HashMap::new();
    for (seg, val) in segment_values {
        by_segment.entry(seg).or_default().push(*val);
    }

    let all_values: Vec<f64> = segment_values.iter().map(|(_, v)| *v).collect();
    let (grand_mean, _) = mean_std(&all_values);
    let ss_total: f64 = all_values.iter().map(|v| (v - grand_mean).powi(2)).sum();
    if ss_total <= 0.0 {
        return None;
    }

    let mut ss_within = 0.0;
    let mut segments = Vec::new();
    for (seg, values) in &by_segment {
        if values.len() < config.min_segment_size {
            continue;
        }
        let (mean, std_dev) = mean_std(values);
        ss_within += values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        segments.push(SegmentStats {
            segment_value: (*seg).to_string(),
            count: values.len() as u64,
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q1: quartile(&sorted, 25.0),
            q3: quartile(&sorted, 75.0),
        });
    }
    if segments.is_empty() {
        return None;
    }
    let r2 = (1.0 - ss_within / ss_total).clamp(0.0, 1.0);
    Some((r2, segments))
}

pub fn discover_subgroups(
    store: &RowSampleStore,
    categorical_columns: &[String],
    numeric_columns: &[String],
    config: &ProfilerConfig,
) -> Vec<SubgroupPattern> {
    let mut patterns = Vec::new();
    for seg_col in categorical_columns {
        let seg_values = store.string_values(seg_col);
        for val_col in numeric_columns {
            if seg_col == val_col {
                continue;
            }
            let num_values = store.numeric_values(val_col);
            let paired: Vec<(&str, f64)> = seg_values
                .iter()
                .zip(num_values.iter())
                .filter_map(|(s, n)| match (s, n) {
                    (Some(s), Some(n)) => Some((*s, *n)),
                    _ => None,
                })
                .collect();
            if let Some((r2, segments)) = variance_explained(&paired, config) {
                if r2 >= config.variance_explained_threshold {
                    patterns.push(SubgroupPattern {
                        segment_column: seg_col.clone(),
                        value_column: val_col.clone(),
                        variance_explained: r2,
                        segments,
                    });
                }
            }
        }
    }
    patterns.sort_by(|a, b| b.variance_explained.partial_cmp(&a.variance_explained).unwrap_or(std::cmp::Ordering::Equal));
    patterns
}

fn pearson_slope(pairs: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let n = pairs.len() as f64;
    if pairs.len() < 3 {
        return None;
    }
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    let slope = cov / var_x;
    let intercept = mean_y - slope * mean_x;
    let residuals: Vec<f64> = pairs.iter().map(|(x, y)| y - (slope * x + intercept)).collect();
    let (_, residual_std) = mean_std(&residuals);
    Some((r, slope, intercept, residual_std))
}

pub fn discover_correlation_patterns(
    store: &RowSampleStore,
    numeric_columns: &[String],
    config: &ProfilerConfig,
) -> Vec<CorrelationPattern> {
    let mut patterns = Vec::new();
    for i in 0..numeric_columns.len() {
        for j in (i + 1)..numeric_columns.len() {
            let xs = store.numeric_values(&numeric_columns[i]);
            let ys = store.numeric_values(&numeric_columns[j]);
            let pairs: Vec<(f64, f64)> = xs
                .iter()
                .zip(ys.iter())
                .filter_map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => Some((*x, *y)),
                    _ => None,
                })
                .collect();
            if let Some((r, slope, intercept, residual_std)) = pearson_slope(&pairs) {
                if r.abs() >= config.context_correlation_threshold {
                    patterns.push(CorrelationPattern {
                        column_x: numeric_columns[i].clone(),
                        column_y: numeric_columns[j].clone(),
                        r,
                        slope,
                        intercept,
                        residual_std,
                    });
                }
            }
        }
    }
    patterns
}

/// A numeric value flagged as an outlier (beyond 3 standard deviations of
/// its column's overall mean) purely from column-level statistics,
/// before context is consulted.
pub struct OutlierCandidate {
    pub column: String,
    pub row_index: usize,
    pub value: f64,
}

pub fn find_outlier_candidates(store: &RowSampleStore, numeric_columns: &[String]) -> Vec<OutlierCandidate> {
    let mut candidates = Vec::new();
    for col in numeric_columns {
        let values = store.numeric_values(col);
        let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        if present.len() < 10 {
            continue;
        }
        let (mean, std_dev) = mean_std(&present);
        if std_dev <= 0.0 {
            continue;
        }
        for (row_index, v) in values.iter().enumerate() {
            if let Some(v) = v {
                if ((v - mean) / std_dev).abs() > 3.0 {
                    candidates.push(OutlierCandidate {
                        column: col.clone(),
                        row_index,
                        value: *v,
                    });
                }
            }
        }
    }
    candidates
}

pub fn validate_candidates(
    store: &RowSampleStore,
    candidates: &[OutlierCandidate],
    subgroup_patterns: &[SubgroupPattern],
    correlation_patterns: &[CorrelationPattern],
    config: &ProfilerConfig,
) -> HashMap<String, ContextValidationResult> {
    let mut by_column: HashMap<String, Vec<&OutlierCandidate>> = HashMap::new();
    for c in candidates {
        by_column.entry(c.column.clone()).or_default().push(c);
    }

    let mut results = HashMap::new();
    for (column, cands) in &by_column {
        let mut explained = 0u64;
        let mut explanations = Vec::new();

        for cand in cands {
            let mut suspicion = 1.0;
            let mut reasons = Vec::new();
            let mut patterns_matched = 0;

            for pattern in subgroup_patterns.iter().filter(|p| &p.value_column == column) {
                let Some(seg_col_idx) = store.column_index(&pattern.segment_column) else { continue };
                let Some(seg_value) = store.rows.get(cand.row_index).and_then(|r| r.get(seg_col_idx)).and_then(|v| v.as_deref()) else { continue };
                if let Some(segment) = pattern.segments.iter().find(|s| s.segment_value == seg_value) {
                    let effective_std = segment.std_dev.max(1e-9);
                    let z = (cand.value - segment.mean).abs() / effective_std;
                    if z <= config.subgroup_sigma {
                        patterns_matched += 1;
                        let factor = if pattern.variance_explained >= config.variance_explained_threshold {
                            config.suspicion_strong_subgroup_factor
                        } else {
                            config.suspicion_weak_subgroup_factor
                        };
                        suspicion *= factor;
                        reasons.push(format!(
                            "within {:.1} std of {}={} segment mean (R²={:.2})",
                            z, pattern.segment_column, seg_value, pattern.variance_explained
                        ));
                    }
                }
            }

            for pattern in correlation_patterns
                .iter()
                .filter(|p| p.column_x == *column || p.column_y == *column)
            {
                let other_col = if pattern.column_x == *column { &pattern.column_y } else { &pattern.column_x };
                let Some(other_idx) = store.column_index(other_col) else { continue };
                let Some(other_raw) = store.rows.get(cand.row_index).and_then(|r| r.get(other_idx)).and_then(|v| v.as_deref()) else { continue };
                let Some(other_val) = other_raw.trim().parse::<f64>().ok() else { continue };
                let predicted = if pattern.column_x == *column {
                    pattern.slope * other_val + pattern.intercept
                } else {
                    (cand.value - pattern.intercept) / pattern.slope.max(1e-9)
                };
                let error = (cand.value - predicted).abs();
                let tolerance = pattern.residual_std.max(1e-9) * config.correlation_tolerance_sigma;
                if error <= tolerance {
                    patterns_matched += 1;
                    suspicion *= config.suspicion_correlation_factor;
                    reasons.push(format!("predicted from {other_col} within tolerance (r={:.2})", pattern.r));
                }
            }

            let is_explained = suspicion < config.suspicion_explained_threshold
                || (config.require_multiple_checks && patterns_matched >= 2);

            if is_explained {
                explained += 1;
                explanations.push(OutlierExplanation {
                    column: column.clone(),
                    row_hint: Some(cand.row_index as u64),
                    value: cand.value,
                    reasons,
                    confidence: (1.0 - suspicion).clamp(0.0, 1.0),
                });
            }
        }

        results.insert(
            column.clone(),
            ContextValidationResult {
                column: column.clone(),
                candidates: cands.len() as u64,
                validated_outliers: (cands.len() as u64).saturating_sub(explained),
                explained,
                sample_explanations: explanations.into_iter().take(5).collect(),
            },
        );
    }
    results
}
