//! Quality Scorer: a four-axis score (completeness, validity, uniqueness,
//! consistency) combined into a single weighted overall score, plus
//! thresholded issues (defects) and observations (informational notes).

use crate::types::{ColumnStatistics, InferredType, QualityMetrics, TypeInference};

pub fn score(type_inference: &TypeInference, stats: &ColumnStatistics) -> QualityMetrics {
    let completeness = 100.0 - stats.null_pct;

    let validity = if matches!(type_inference.inferred_type, InferredType::Integer | InferredType::Float) {
        100.0
    } else {
        100.0 * type_inference.confidence
    };

    let uniqueness = stats.cardinality * 100.0;

    let consistency = stats
        .dominant_patterns
        .first()
        .map_or(100.0, |p| p.percentage);

    let overall = (0.3 * completeness + 0.3 * validity + 0.2 * uniqueness + 0.2 * consistency).clamp(0.0, 100.0);

    let mut issues = Vec::new();
    let mut observations = Vec::new();

    if completeness < 50.0 {
        issues.push("Low completeness".to_string());
    } else if completeness < 90.0 {
        issues.push("Moderate completeness".to_string());
    }

    if validity < 95.0 {
        issues.push("Type inconsistency".to_string());
    }

    if (stats.cardinality - 1.0).abs() < f64::EPSILON && stats.count > 1 {
        observations.push("All values are unique (potential key field)".to_string());
    } else if stats.cardinality < 0.01 && stats.unique_count < 100 && stats.count > 100 {
        observations.push("Low cardinality (likely categorical)".to_string());
    }

    if !stats.dominant_patterns.is_empty() && consistency < 50.0 {
        observations.push("Multiple patterns".to_string());
    }

    QualityMetrics {
        completeness,
        validity,
        uniqueness,
        consistency,
        overall_score: overall,
        issues,
        observations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeInference, Quartiles, NumericSummary};

    fn base_stats() -> ColumnStatistics {
        ColumnStatistics {
            count: 1000,
            null_count: 0,
            null_pct: 0.0,
            unique_count: 1000,
            unique_pct: 100.0,
            cardinality: 1.0,
            numeric: Some(NumericSummary {
                min: 0.0,
                max: 1.0,
                mean: 0.5,
                median: 0.5,
                std_dev: 0.1,
                quartiles: Quartiles { q1: 0.25, q2: 0.5, q3: 0.75 },
            }),
            mode: None,
            top_values: Vec::new(),
            string_length: None,
            dominant_patterns: Vec::new(),
            semantic_type: None,
            sampling_strategy: "Analyzed all 1000 rows".to_string(),
        }
    }

    fn base_inference() -> TypeInference {
        TypeInference {
            declared_type: None,
            inferred_type: InferredType::Integer,
            confidence: 1.0,
            is_known: true,
            conflicts: Vec::new(),
            sample_values: Vec::new(),
        }
    }

    #[test]
    fn overall_score_matches_weighted_formula() {
        let inference = base_inference();
        let stats = base_stats();
        let metrics = score(&inference, &stats);
        let expected = 0.3 * 100.0 + 0.3 * 100.0 + 0.2 * 100.0 + 0.2 * 100.0;
        assert!((metrics.overall_score - expected).abs() < 1e-6);
    }

    #[test]
    fn low_cardinality_is_observation_not_issue() {
        let inference = base_inference();
        let mut stats = base_stats();
        stats.count = 10_000;
        stats.cardinality = 3.0 / 10_000.0;
        stats.unique_count = 3;
        let metrics = score(&inference, &stats);
        assert!(metrics
            .observations
            .iter()
            .any(|o| o.contains("Low cardinality")));
        assert!(!metrics.issues.iter().any(|i| i.contains("cardinality")));
    }

    #[test]
    fn high_null_rate_is_low_completeness_issue() {
        let inference = base_inference();
        let mut stats = base_stats();
        stats.null_pct = 60.0;
        let metrics = score(&inference, &stats);
        assert!(metrics.issues.contains(&"Low completeness".to_string()));
    }
}
