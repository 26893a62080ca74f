//! Statistics Calculator: finalizes numeric stats, frequency stats,
//! string-length stats, pattern stats, and the cardinality estimate for
//! a single column.

use crate::accumulator::ColumnAccumulator;
use crate::column_intelligence;
use crate::config::ProfilerConfig;
use crate::sampling::percentile;
use crate::types::{
    ColumnStatistics, InferredType, NumericSummary, PatternFrequency, Quartiles, StringLengthSummary,
    ValueFrequency,
};

const TOP_N: usize = 10;

fn numeric_summary(acc: &ColumnAccumulator) -> Option<NumericSummary> {
    let reservoir = acc.numeric_reservoir.items();
    if reservoir.is_empty() {
        return None;
    }
    let filtered: Vec<f64> = reservoir
        .iter()
        .copied()
        .filter(|v| v.is_finite() && v.abs() < 1e100)
        .collect();

    if filtered.len() * 2 < reservoir.len() {
        // Fewer than half the reservoir survived filtering: the column is
        // likely misclassified as numeric.
        return None;
    }

    let mut sorted = filtered.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = if sorted.len() > 1 {
        sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };

    Some(NumericSummary {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median: percentile(&sorted, 50.0),
        std_dev: variance.sqrt(),
        quartiles: Quartiles {
            q1: percentile(&sorted, 25.0),
            q2: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
        },
    })
}

fn frequency_stats(acc: &ColumnAccumulator, non_null_count: u64) -> (Option<ValueFrequency>, Vec<ValueFrequency>) {
    let mut entries: Vec<(&String, &u64)> = acc.value_freq_map().iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let denom = non_null_count.max(1) as f64;
    let top_values: Vec<ValueFrequency> = entries
        .iter()
        .take(TOP_N)
        .map(|(value, count)| ValueFrequency {
            value: (*value).clone(),
            count: **count,
            percentage: 100.0 * **count as f64 / denom,
        })
        .collect();
    let mode = top_values.first().cloned();
    (mode, top_values)
}

fn string_length_summary(acc: &ColumnAccumulator) -> Option<StringLengthSummary> {
    let lengths = acc.string_length_reservoir.items();
    if lengths.is_empty() {
        return None;
    }
    let min = *lengths.iter().min()?;
    let max = *lengths.iter().max()?;
    let avg = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    Some(StringLengthSummary { min, max, avg })
}

fn pattern_stats(acc: &ColumnAccumulator) -> Vec<PatternFrequency> {
    let sample_count = acc.sample_values.len().max(1) as f64;
    let mut entries: Vec<(&String, &u64)> = acc.pattern_tally.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(TOP_N)
        .map(|(pattern, count)| PatternFrequency {
            pattern: pattern.clone(),
            count: *count,
            percentage: 100.0 * *count as f64 / sample_count,
        })
        .collect()
}

fn cardinality_estimate(acc: &ColumnAccumulator, non_null_count: u64, config: &ProfilerConfig) -> u64 {
    if non_null_count == 0 {
        return 0;
    }
    if !acc.is_freq_map_saturated() {
        return acc.value_freq_map().len() as u64;
    }
    if config.hll_enabled {
        acc.cardinality_estimator.estimate().round() as u64
    } else {
        acc.extrapolated_unique_count()
    }
}

fn sampling_strategy_for(acc: &ColumnAccumulator, inferred_type: InferredType) -> String {
    let total = acc.total_processed;
    let hint = (acc.intelligence.semantic_hint != "unknown").then_some(acc.intelligence.semantic_hint.as_str());
    let (seen, capacity) = match inferred_type {
        InferredType::Integer | InferredType::Float => (
            acc.numeric_reservoir.items_seen(),
            acc.numeric_reservoir.capacity() as u64,
        ),
        _ => (
            acc.string_length_reservoir.items_seen(),
            acc.string_length_reservoir.capacity() as u64,
        ),
    };
    if seen <= capacity {
        column_intelligence::sampling_summary(total, total, hint)
    } else {
        column_intelligence::sampling_summary(total, capacity, hint)
    }
}

pub fn compute(acc: &ColumnAccumulator, inferred_type: InferredType, config: &ProfilerConfig) -> ColumnStatistics {
    let non_null_count = acc.total_processed.saturating_sub(acc.null_count);
    let unique_count = cardinality_estimate(acc, non_null_count, config);
    let cardinality = if non_null_count == 0 {
        0.0
    } else {
        (unique_count as f64 / non_null_count as f64).min(1.0)
    };
    let (mode, top_values) = frequency_stats(acc, non_null_count);

    ColumnStatistics {
        count: acc.total_processed,
        null_count: acc.null_count,
        null_pct: if acc.total_processed == 0 {
            0.0
        } else {
            100.0 * acc.null_count as f64 / acc.total_processed as f64
        },
        unique_count,
        unique_pct: if non_null_count == 0 {
            0.0
        } else {
            100.0 * unique_count as f64 / non_null_count as f64
        },
        cardinality,
        numeric: matches!(inferred_type, InferredType::Integer | InferredType::Float)
            .then(|| numeric_summary(acc))
            .flatten(),
        mode,
        top_values,
        string_length: string_length_summary(acc),
        dominant_patterns: pattern_stats(acc),
        semantic_type: None,
        sampling_strategy: sampling_strategy_for(acc, inferred_type),
    }
}
