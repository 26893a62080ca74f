//! Type Inferencer: reconciles a column's type tally (and declared type,
//! if any) into a single verdict with confidence and runner-up conflicts.

use crate::accumulator::ColumnAccumulator;
use crate::types::{InferredType, TypeConflict, TypeInference};

pub fn infer(acc: &ColumnAccumulator) -> TypeInference {
    if let Some(declared) = acc.declared_type {
        return TypeInference {
            declared_type: Some(declared),
            inferred_type: declared,
            confidence: 1.0,
            is_known: true,
            conflicts: Vec::new(),
            sample_values: acc.sample_values.iter().take(5).cloned().collect(),
        };
    }

    if acc.type_tally.is_empty() {
        return TypeInference {
            declared_type: None,
            inferred_type: InferredType::Empty,
            confidence: 0.0,
            is_known: false,
            conflicts: Vec::new(),
            sample_values: Vec::new(),
        };
    }

    let mut tally: Vec<(InferredType, u64)> = acc.type_tally.iter().map(|(t, c)| (*t, *c)).collect();
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    let (primary_type, primary_count) = tally[0];
    let sampled = acc.type_sampled_count.max(1);
    let confidence = primary_count as f64 / sampled as f64;

    let conflicts: Vec<TypeConflict> = tally
        .iter()
        .skip(1)
        .take(3)
        .filter(|(_, count)| *count as f64 / sampled as f64 >= 0.01)
        .map(|(t, count)| TypeConflict {
            inferred_type: *t,
            count: *count,
            percentage: 100.0 * *count as f64 / sampled as f64,
        })
        .collect();

    TypeInference {
        declared_type: None,
        inferred_type: primary_type,
        confidence: confidence.clamp(0.0, 1.0),
        is_known: true,
        conflicts,
        sample_values: acc.sample_values.iter().take(5).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfilerConfig;
    use crate::source::ColumnView;

    #[test]
    fn declared_type_always_wins_at_full_confidence() {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new("x", 0, Some(InferredType::String), &cfg);
        acc.process_chunk(&ColumnView::Strings(vec![Some("1".into())]), &cfg);
        let inference = infer(&acc);
        assert_eq!(inference.inferred_type, InferredType::String);
        assert_eq!(inference.confidence, 1.0);
        assert!(inference.is_known);
    }

    #[test]
    fn argmax_tally_wins_with_conflicts_reported() {
        let cfg = ProfilerConfig::default();
        let mut acc = ColumnAccumulator::new("zzz_mixed", 0, None, &cfg);
        let values: Vec<Option<String>> = vec![
            Some("1".into()),
            Some("2".into()),
            Some("3".into()),
            Some("hello".into()),
        ];
        acc.process_chunk(&ColumnView::Strings(values), &cfg);
        let inference = infer(&acc);
        assert_eq!(inference.inferred_type, InferredType::Integer);
        assert!((inference.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_tally_is_unknown_without_declared_type() {
        let cfg = ProfilerConfig::default();
        let acc = ColumnAccumulator::new("empty_col", 0, None, &cfg);
        let inference = infer(&acc);
        assert_eq!(inference.inferred_type, InferredType::Empty);
        assert_eq!(inference.confidence, 0.0);
    }
}
