//! Validation Suggestor: maps a column's profile and semantic tag to a
//! ranked list of validation specifications. Each suggestion carries its
//! own typed parameters rather than an ad-hoc dict, per the closed-sum
//! redesign this crate follows.

use crate::types::{ColumnProfile, InferredType, Severity, ValidationKind, ValidationSuggestion};

const UNLIKELY_ID_NAMES: &[&str] = &["id", "key", "code", "identifier"];

fn should_suggest_range(column: &ColumnProfile, row_count: u64) -> bool {
    let stats = &column.statistics;
    let semantic = column
        .semantic
        .primary_tag
        .as_deref()
        .unwrap_or("");

    if semantic.contains("Identifier") || semantic.contains("identifier") || semantic.contains("Category") {
        return false;
    }
    if stats.unique_count == 2 {
        return false;
    }
    if stats.cardinality > 0.8 {
        return false;
    }
    if stats.cardinality < 0.05 && stats.unique_count < 20 {
        return false;
    }
    if let Some(numeric) = &stats.numeric {
        let value_range = numeric.max - numeric.min;
        if row_count > 0 && value_range > 10.0 * row_count as f64 {
            return false;
        }
        if column.type_inference.inferred_type == InferredType::Integer && numeric.min > 1e9 {
            return false;
        }
    }
    let name_lower = column.name.to_lowercase();
    if UNLIKELY_ID_NAMES.iter().any(|n| name_lower.contains(n)) && stats.cardinality > 0.5 {
        return false;
    }
    true
}

pub fn suggest_for_dataset(row_count: u64) -> Vec<ValidationSuggestion> {
    let mut suggestions = Vec::new();
    if row_count > 0 {
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::EmptyFileCheck,
            severity: Severity::Error,
            reason: "dataset contains at least one row".to_string(),
            confidence: 1.00,
        });
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::RowCountRangeCheck {
                min: (row_count as f64 * 0.5) as u64,
                max: (row_count as f64 * 2.0) as u64,
            },
            severity: Severity::Warning,
            reason: format!("observed row count {row_count}; future runs should stay within 0.5x-2x"),
            confidence: 0.80,
        });
    }
    suggestions
}

pub fn suggest_for_column(column: &ColumnProfile, row_count: u64) -> Vec<ValidationSuggestion> {
    let mut suggestions = Vec::new();
    let stats = &column.statistics;

    if stats.count > 0 && 100.0 - stats.null_pct > 95.0 {
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::MandatoryFieldCheck {
                column: column.name.clone(),
            },
            severity: Severity::Error,
            reason: format!("{:.1}% completeness observed", 100.0 - stats.null_pct),
            confidence: 0.95,
        });
    }

    if matches!(column.type_inference.inferred_type, InferredType::Integer | InferredType::Float)
        && should_suggest_range(column, row_count)
    {
        if let Some(numeric) = &stats.numeric {
            suggestions.push(ValidationSuggestion {
                kind: ValidationKind::RangeCheck {
                    column: column.name.clone(),
                    min: numeric.min,
                    max: numeric.max,
                },
                severity: Severity::Warning,
                reason: "observed numeric range".to_string(),
                confidence: 0.90,
            });
        }
    }

    if stats.cardinality < 0.05 && stats.unique_count < 20 {
        let values = stats.top_values.iter().map(|v| v.value.clone()).collect();
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::ValidValuesCheck {
                column: column.name.clone(),
                values,
            },
            severity: Severity::Error,
            reason: "low cardinality suggests a closed value set".to_string(),
            confidence: 0.85,
        });
    }

    if stats.cardinality > 0.99 && stats.count > 100 {
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::UniqueKeyCheck {
                column: column.name.clone(),
            },
            severity: Severity::Error,
            reason: "near-total uniqueness suggests a key field".to_string(),
            confidence: 0.95,
        });
    }

    if column.type_inference.inferred_type == InferredType::Date {
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::DateFormatCheck {
                column: column.name.clone(),
                format: "ISO-8601-like".to_string(),
            },
            severity: Severity::Error,
            reason: "values matched a recognizable date pattern".to_string(),
            confidence: 0.80,
        });
    }

    if let Some(pattern_type) = column.pattern.detected_semantic_type {
        let severity = if column.pattern.pii_detected { Severity::Error } else { Severity::Warning };
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::RegexCheck {
                column: column.name.clone(),
                pattern: format!("{pattern_type:?}"),
            },
            severity,
            reason: "pattern detector matched with high confidence".to_string(),
            confidence: column.pattern.confidence,
        });
    }

    if column
        .semantic
        .primary_tag
        .as_deref()
        .map(|t| t.to_lowercase().contains("monetaryamount"))
        .unwrap_or(false)
        && matches!(column.type_inference.inferred_type, InferredType::Integer | InferredType::Float)
    {
        suggestions.push(ValidationSuggestion {
            kind: ValidationKind::RangeCheck {
                column: column.name.clone(),
                min: 0.0,
                max: f64::INFINITY,
            },
            severity: Severity::Error,
            reason: "monetary amounts are expected to be non-negative".to_string(),
            confidence: 0.85,
        });
    }

    suggestions
}

/// Sorts by confidence descending, matching the invariant that a
/// suggestion list is never reported out of order.
pub fn sort_by_confidence(mut suggestions: Vec<ValidationSuggestion>) -> Vec<ValidationSuggestion> {
    suggestions.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    suggestions
}
