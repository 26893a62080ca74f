//! The Column Accumulator: per-column streaming state with bounded
//! memory. One instance per column, composed inside the profiler and
//! updated once per chunk in schema order.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::OnceLock;

use crate::column_intelligence::{self, ColumnIntelligence};
use crate::config::ProfilerConfig;
use crate::sampling::{HyperLogLog, ReservoirSampler};
use crate::source::{ColumnView, RawValue};
use crate::types::InferredType;

const PLACEHOLDER_NULLS: &[&str] = &["n/a", "na", "null", "none", "-", "unknown", "?", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NullKind {
    NotNull,
    Absent,
    Whitespace,
    Placeholder,
}

fn classify_null(raw: &RawValue<'_>) -> NullKind {
    match raw {
        RawValue::Null => NullKind::Absent,
        RawValue::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                if s.is_empty() {
                    NullKind::Placeholder
                } else {
                    NullKind::Whitespace
                }
            } else if PLACEHOLDER_NULLS.contains(&trimmed.to_lowercase().as_str()) {
                NullKind::Placeholder
            } else {
                NullKind::NotNull
            }
        }
        _ => NullKind::NotNull,
    }
}

fn date_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^\d{4}-\d{2}-\d{2}$",   // YYYY-MM-DD
            r"^\d{2}/\d{2}/\d{4}$",   // DD/MM/YYYY or MM/DD/YYYY
            r"^\d{4}/\d{2}/\d{2}$",   // YYYY/MM/DD
            r"^\d{2}-\d{2}-\d{4}$",   // DD-MM-YYYY
        ]
        .iter()
        .map(|p| Regex::new(p).expect("date pattern must compile"))
        .collect()
    })
}

fn is_boolean_literal(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "true" | "false" | "yes" | "no"
    )
}

/// Classifies a single non-null raw value, following the resolution order
/// boolean -> integer -> float -> date -> string.
pub fn classify_value(raw: &RawValue<'_>) -> InferredType {
    match raw {
        RawValue::Bool(_) => InferredType::Boolean,
        RawValue::Int(_) => InferredType::Integer,
        RawValue::Float(v) => {
            if v.fract() == 0.0 && v.is_finite() {
                InferredType::Integer
            } else {
                InferredType::Float
            }
        }
        RawValue::Str(s) => {
            let trimmed = s.trim();
            if is_boolean_literal(trimmed) {
                return InferredType::Boolean;
            }
            if trimmed.parse::<i64>().is_ok() {
                return InferredType::Integer;
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    return InferredType::Float;
                }
            }
            if date_patterns().iter().any(|re| re.is_match(trimmed)) {
                return InferredType::Date;
            }
            InferredType::String
        }
        RawValue::Null => InferredType::Empty,
    }
}

fn display_string(raw: &RawValue<'_>) -> String {
    match raw {
        RawValue::Null => String::new(),
        RawValue::Str(s) => (*s).to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Bool(b) => b.to_string(),
    }
}

fn numeric_value(raw: &RawValue<'_>) -> Option<f64> {
    match raw {
        RawValue::Int(i) => Some(*i as f64),
        RawValue::Float(f) => Some(*f),
        RawValue::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn structural_pattern(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                '9'
            } else if c.is_alphabetic() {
                'A'
            } else {
                c
            }
        })
        .collect()
}

pub struct ColumnAccumulator {
    pub column_name: String,
    pub declared_type: Option<InferredType>,
    pub intelligence: ColumnIntelligence,

    pub total_processed: u64,
    pub null_count: u64,
    pub whitespace_null_count: u64,
    pub placeholder_null_count: u64,

    pub type_tally: HashMap<InferredType, u64>,
    pub type_sampled_count: u64,
    chunks_seen: u64,

    value_freq: HashMap<String, u64>,
    freq_map_saturated: bool,

    pub numeric_reservoir: ReservoirSampler<f64>,
    pub string_length_reservoir: ReservoirSampler<usize>,
    pub cardinality_estimator: HyperLogLog,
    tracked_unique_saturated_at: Option<u64>,

    pub pattern_tally: HashMap<String, u64>,
    pattern_tally_rows_counted: u64,

    pub sample_values: Vec<String>,

    rng: StdRng,
}

impl ColumnAccumulator {
    pub fn new(column_name: &str, column_index: usize, declared_type: Option<InferredType>, config: &ProfilerConfig) -> Self {
        let intelligence = column_intelligence::analyze_column(column_name);
        let numeric_capacity = if intelligence.semantic_hint == "unknown" {
            config.k_num_default
        } else {
            intelligence.recommended_sample_size
        };
        let seed = config.seed ^ (column_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            column_name: column_name.to_string(),
            declared_type,
            intelligence,
            total_processed: 0,
            null_count: 0,
            whitespace_null_count: 0,
            placeholder_null_count: 0,
            type_tally: HashMap::new(),
            type_sampled_count: 0,
            chunks_seen: 0,
            value_freq: HashMap::new(),
            freq_map_saturated: false,
            numeric_reservoir: ReservoirSampler::new(numeric_capacity),
            string_length_reservoir: ReservoirSampler::new(config.k_len),
            cardinality_estimator: HyperLogLog::new(crate::sampling::hyperloglog::DEFAULT_PRECISION),
            tracked_unique_saturated_at: None,
            pattern_tally: HashMap::new(),
            pattern_tally_rows_counted: 0,
            sample_values: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn process_chunk(&mut self, view: &ColumnView, config: &ProfilerConfig) {
        let rows = view.len();
        self.total_processed += rows as u64;
        self.chunks_seen += 1;
        let is_first_chunk = self.chunks_seen == 1;

        // Step 3: type tally schedule. First chunk: classify every value.
        // Every 10th subsequent chunk: classify a random subsample up to 1000.
        let type_sample_rows: Vec<usize> = if is_first_chunk {
            (0..rows).collect()
        } else if self.chunks_seen % 10 == 0 {
            let take = rows.min(1000);
            let mut idxs: Vec<usize> = (0..rows).collect();
            // Partial shuffle to pick a uniform random subsample without
            // biasing toward the front of the chunk.
            for i in 0..take {
                let j = self.rng.gen_range(i..rows);
                idxs.swap(i, j);
            }
            idxs.truncate(take);
            idxs
        } else {
            Vec::new()
        };
        let type_sample_set: std::collections::HashSet<usize> = type_sample_rows.iter().copied().collect();

        // Step 4 cap: once the frequency map is full, existing-key updates
        // are themselves drawn from a bounded per-chunk reservoir sample
        // rather than applied in row order, so a key that happens to recur
        // early in the chunk cannot exhaust the whole update budget.
        let mut existing_key_sample: ReservoirSampler<String> = ReservoirSampler::new(config.sample_freq);

        for row in 0..rows {
            let raw = view.raw(row);
            match classify_null(&raw) {
                NullKind::Absent => {
                    self.null_count += 1;
                    continue;
                }
                NullKind::Whitespace => {
                    self.whitespace_null_count += 1;
                    self.null_count += 1;
                    continue;
                }
                NullKind::Placeholder => {
                    self.placeholder_null_count += 1;
                    self.null_count += 1;
                    continue;
                }
                NullKind::NotNull => {}
            }

            // Step 3: type tally.
            if type_sample_set.contains(&row) {
                let t = classify_value(&raw);
                *self.type_tally.entry(t).or_insert(0) += 1;
                self.type_sampled_count += 1;
            }

            let display = display_string(&raw);

            // Step 4: value frequency map, capped at K_FREQ keys. Once full,
            // only a bounded per-chunk sample of rows may still bump an
            // existing key's count; the map is an estimator, not a census.
            if self.value_freq.len() < config.k_freq {
                *self.value_freq.entry(display.clone()).or_insert(0) += 1;
            } else if self.value_freq.contains_key(&display) {
                self.freq_map_saturated = true;
                if self.tracked_unique_saturated_at.is_none() {
                    self.tracked_unique_saturated_at = Some(self.total_processed);
                }
                existing_key_sample.add(display.clone(), &mut self.rng);
            } else {
                self.freq_map_saturated = true;
                if self.tracked_unique_saturated_at.is_none() {
                    self.tracked_unique_saturated_at = Some(self.total_processed);
                }
            }

            // Cardinality: HyperLogLog sees every non-null value regardless
            // of the frequency map's cap.
            self.cardinality_estimator
                .add(crate::sampling::hyperloglog::fnv1a(display.as_bytes()));

            // Step 5: numeric reservoir.
            if let Some(n) = numeric_value(&raw) {
                self.numeric_reservoir.add(n, &mut self.rng);
            }

            // Step 6: string-length reservoir.
            self.string_length_reservoir.add(display.chars().count(), &mut self.rng);

            // Step 7: pattern tally, first chunk only, up to 100 values.
            if is_first_chunk && self.pattern_tally_rows_counted < config.pattern_tally_sample as u64 {
                let pattern = structural_pattern(&display);
                *self.pattern_tally.entry(pattern).or_insert(0) += 1;
                self.pattern_tally_rows_counted += 1;
            }

            // Step 8: sample values, first chunk only.
            if is_first_chunk && self.sample_values.len() < config.n_sample {
                self.sample_values.push(display);
            }
        }

        for key in existing_key_sample.items() {
            if let Some(count) = self.value_freq.get_mut(key) {
                *count += 1;
            }
        }
    }

    pub fn value_freq_map(&self) -> &HashMap<String, u64> {
        &self.value_freq
    }

    pub fn is_freq_map_saturated(&self) -> bool {
        self.freq_map_saturated
    }

    /// Extrapolated unique-count fallback for when the HyperLogLog path is
    /// disabled: `tracked_keys * 1 / sample_rate`.
    pub fn extrapolated_unique_count(&self) -> u64 {
        if !self.freq_map_saturated {
            return self.value_freq.len() as u64;
        }
        let tracked = self.value_freq.len() as u64;
        let seen_at_saturation = self.tracked_unique_saturated_at.unwrap_or(self.total_processed).max(1);
        let sample_rate = seen_at_saturation as f64 / self.total_processed.max(1) as f64;
        if sample_rate <= 0.0 {
            tracked
        } else {
            (tracked as f64 / sample_rate).round() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ColumnView;

    fn strings(values: &[&str]) -> ColumnView {
        ColumnView::Strings(values.iter().map(|v| Some((*v).to_string())).collect())
    }

    #[test]
    fn null_predicate_folds_three_categories_into_one_count() {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new("status", 0, None, &cfg);
        let view = strings(&["active", "  ", "n/a", "NULL", "closed", ""]);
        acc.process_chunk(&view, &cfg);
        assert_eq!(acc.total_processed, 6);
        assert_eq!(acc.whitespace_null_count, 1);
        assert_eq!(acc.placeholder_null_count, 3);
        assert_eq!(acc.null_count, 4);
    }

    #[test]
    fn first_chunk_classifies_every_value() {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new("amount", 0, None, &cfg);
        let view = strings(&["1", "2", "3.5", "true"]);
        acc.process_chunk(&view, &cfg);
        assert_eq!(acc.type_sampled_count, 4);
    }

    #[test]
    fn pattern_tally_only_populated_on_first_chunk() {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new("code", 0, None, &cfg);
        acc.process_chunk(&strings(&["AB12"]), &cfg);
        assert!(!acc.pattern_tally.is_empty());
        let before = acc.pattern_tally.clone();
        acc.process_chunk(&strings(&["ZZ99"]), &cfg);
        assert_eq!(acc.pattern_tally, before);
    }

    #[test]
    fn numeric_reservoir_bounded_by_capacity() {
        let mut cfg = ProfilerConfig::default();
        cfg.k_num_default = 5;
        let mut acc = ColumnAccumulator::new("zzz_value", 0, None, &cfg);
        let values: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        acc.process_chunk(&strings(&refs), &cfg);
        assert!(acc.numeric_reservoir.len() <= 5);
        assert_eq!(acc.numeric_reservoir.items_seen(), 1000);
    }

    #[test]
    fn classify_value_resolution_order() {
        assert_eq!(classify_value(&RawValue::Str("true")), InferredType::Boolean);
        assert_eq!(classify_value(&RawValue::Str("13")), InferredType::Integer);
        assert_eq!(classify_value(&RawValue::Str("13.5")), InferredType::Float);
        assert_eq!(classify_value(&RawValue::Str("2024-01-01")), InferredType::Date);
        assert_eq!(classify_value(&RawValue::Str("hello")), InferredType::String);
    }
}
