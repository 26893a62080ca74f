//! Small embedded taxonomy tables (finance, schema.org, wikidata) and the
//! weighted scorer the tagger uses to pick a primary tag. The full FIBO
//! taxonomy is out of scope for this crate; these tables cover the
//! families that matter in practice (monetary amount, identifier,
//! contact/person fields, boolean flags, generic category) well enough to
//! exercise the scoring algorithm and precedence rules faithfully.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::ProfilerConfig;
use crate::types::{ColumnStatistics, InferredType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Finance,
    SchemaOrg,
    Wikidata,
}

pub struct TaxonomyEntry {
    pub kind: TaxonomyKind,
    pub tag: &'static str,
    pub name_patterns: &'static [&'static str],
    pub expected_dtypes: &'static [InferredType],
    pub value_pattern: Option<&'static str>,
    pub cardinality_range: Option<(f64, f64)>,
    pub value_range: Option<(f64, f64)>,
    pub length_range: Option<(usize, usize)>,
    pub reference_values: Option<&'static [&'static str]>,
}

pub struct TaxonomyScore {
    pub tag: &'static str,
    pub kind: TaxonomyKind,
    pub score: f64,
    pub evidence: Vec<String>,
}

fn compiled(pattern: &str) -> Regex {
    // Small bounded table, recompiled per call is cheap and keeps this
    // module free of unsafe leaking tricks.
    Regex::new(pattern).expect("taxonomy pattern must compile")
}

static TAXONOMY: OnceLock<Vec<TaxonomyEntry>> = OnceLock::new();

fn taxonomy() -> &'static [TaxonomyEntry] {
    TAXONOMY.get_or_init(|| {
        vec![
            TaxonomyEntry {
                kind: TaxonomyKind::Finance,
                tag: "fibo:MonetaryAmount",
                name_patterns: &["(?i)amount", "(?i)price", "(?i)balance", "(?i)cost", "(?i)total", "(?i)fee", "(?i)revenue"],
                expected_dtypes: &[InferredType::Float, InferredType::Integer],
                value_pattern: Some(r"^-?\d+(\.\d{1,4})?$"),
                cardinality_range: None,
                value_range: Some((-1e12, 1e12)),
                length_range: None,
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::Finance,
                tag: "fibo:AccountIdentifier",
                name_patterns: &["(?i)account", "(?i)iban", "(?i)routing"],
                expected_dtypes: &[InferredType::String, InferredType::Integer],
                value_pattern: None,
                cardinality_range: Some((0.9, 1.0)),
                value_range: None,
                length_range: Some((4, 34)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::SchemaOrg,
                tag: "schema:Email",
                name_patterns: &["(?i)e?mail"],
                expected_dtypes: &[InferredType::String],
                value_pattern: Some(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
                cardinality_range: Some((0.5, 1.0)),
                value_range: None,
                length_range: Some((5, 254)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::SchemaOrg,
                tag: "schema:Telephone",
                name_patterns: &["(?i)phone", "(?i)mobile", "(?i)tel(ephone)?$"],
                expected_dtypes: &[InferredType::String, InferredType::Integer],
                value_pattern: Some(r"^\+?[\d\-\(\) ]{7,}$"),
                cardinality_range: None,
                value_range: None,
                length_range: Some((7, 20)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::SchemaOrg,
                tag: "schema:Boolean",
                name_patterns: &["(?i)flag", "(?i)^is_", "(?i)^has_", "(?i)active", "(?i)enabled"],
                expected_dtypes: &[InferredType::Boolean, InferredType::String, InferredType::Integer],
                value_pattern: None,
                cardinality_range: Some((0.0, 0.05)),
                value_range: None,
                length_range: None,
                reference_values: Some(&["true", "false", "0", "1", "yes", "no"]),
            },
            TaxonomyEntry {
                kind: TaxonomyKind::SchemaOrg,
                tag: "schema:Category",
                name_patterns: &["(?i)category", "(?i)status", "(?i)type$", "(?i)class"],
                expected_dtypes: &[InferredType::String],
                value_pattern: None,
                cardinality_range: Some((0.0, 0.1)),
                value_range: None,
                length_range: Some((1, 40)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::SchemaOrg,
                tag: "schema:Text",
                name_patterns: &["(?i)description", "(?i)comment", "(?i)note", "(?i)^name$"],
                expected_dtypes: &[InferredType::String],
                value_pattern: None,
                cardinality_range: None,
                value_range: None,
                length_range: Some((1, 10_000)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::Wikidata,
                tag: "wd:Person",
                name_patterns: &["(?i)^name$", "(?i)full_name", "(?i)customer_name"],
                expected_dtypes: &[InferredType::String],
                value_pattern: Some(r"^[A-Z][a-zA-Z'\-]+(\s[A-Z][a-zA-Z'\-]+)+$"),
                cardinality_range: Some((0.5, 1.0)),
                value_range: None,
                length_range: Some((3, 100)),
                reference_values: None,
            },
            TaxonomyEntry {
                kind: TaxonomyKind::Wikidata,
                tag: "wd:Identifier",
                name_patterns: &["(?i)^id$", "(?i)_id$", "(?i)identifier"],
                expected_dtypes: &[InferredType::Integer, InferredType::String],
                value_pattern: None,
                cardinality_range: Some((0.9, 1.0)),
                value_range: None,
                length_range: None,
                reference_values: None,
            },
        ]
    })
}

fn value_regex_match_rate(pattern: &str, samples: &[String]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let re = compiled(pattern);
    let hits = samples.iter().filter(|s| re.is_match(s)).count();
    hits as f64 / samples.len() as f64
}

fn reference_overlap(reference: &[&str], samples: &[String]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let set: std::collections::HashSet<String> = reference.iter().map(|s| s.to_lowercase()).collect();
    let hits = samples.iter().filter(|s| set.contains(&s.to_lowercase())).count();
    hits as f64 / samples.len() as f64
}

fn score_entry(
    entry: &TaxonomyEntry,
    column_name: &str,
    inferred_type: InferredType,
    stats: &ColumnStatistics,
    samples: &[String],
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut evidence = Vec::new();

    if entry.name_patterns.iter().any(|p| compiled(p).is_match(column_name)) {
        score += 0.5;
        evidence.push(format!("name_pattern:{}", entry.tag));
    }

    if entry.expected_dtypes.contains(&inferred_type) {
        score += 0.2;
        evidence.push(format!("dtype:{inferred_type:?}"));
    } else {
        score -= 0.3;
    }

    if let Some((lo, hi)) = entry.cardinality_range {
        if stats.cardinality >= lo && stats.cardinality <= hi {
            score += 0.15;
            evidence.push("cardinality_match".to_string());
        } else {
            score -= 0.1;
        }
    }

    if let Some((lo, hi)) = entry.value_range {
        if let Some(numeric) = &stats.numeric {
            if numeric.min >= lo && numeric.max <= hi {
                score += 0.1;
                evidence.push("value_range_match".to_string());
            } else {
                score -= 0.2;
            }
        }
    }

    if let Some((lo, hi)) = entry.length_range {
        if let Some(len) = &stats.string_length {
            if len.min >= lo && len.max <= hi {
                score += 0.15;
                evidence.push("length_match".to_string());
            } else {
                score -= 0.1;
            }
        }
    }

    if let Some(pattern) = entry.value_pattern {
        let rate = value_regex_match_rate(pattern, samples);
        if rate > 0.5 {
            score += 0.3;
            evidence.push(format!("value_regex:{}", entry.tag));
        }
    }

    if let Some(reference) = entry.reference_values {
        let overlap = reference_overlap(reference, samples);
        if overlap > 0.7 {
            score += 0.2;
            evidence.push("reference_overlap_high".to_string());
        } else if overlap < 0.3 {
            score -= 0.15;
        }
    }

    (score.clamp(0.0, 1.0), evidence)
}

fn threshold_for(kind: TaxonomyKind, config: &ProfilerConfig) -> f64 {
    match kind {
        TaxonomyKind::Finance => config.finance_taxonomy_threshold,
        TaxonomyKind::SchemaOrg => config.schema_org_taxonomy_threshold,
        TaxonomyKind::Wikidata => config.wikidata_taxonomy_threshold,
    }
}

/// Best candidate per taxonomy kind meeting that kind's acceptance
/// threshold, in (finance, schema.org, wikidata) order.
pub fn best_candidates(
    column_name: &str,
    inferred_type: InferredType,
    stats: &ColumnStatistics,
    samples: &[String],
    config: &ProfilerConfig,
) -> [Option<TaxonomyScore>; 3] {
    let mut finance = None;
    let mut schema_org = None;
    let mut wikidata = None;

    for entry in taxonomy() {
        let (score, evidence) = score_entry(entry, column_name, inferred_type, stats, samples);
        if score < threshold_for(entry.kind, config) {
            continue;
        }
        let candidate = TaxonomyScore {
            tag: entry.tag,
            kind: entry.kind,
            score,
            evidence,
        };
        let slot = match entry.kind {
            TaxonomyKind::Finance => &mut finance,
            TaxonomyKind::SchemaOrg => &mut schema_org,
            TaxonomyKind::Wikidata => &mut wikidata,
        };
        if slot.as_ref().map_or(true, |existing: &TaxonomyScore| candidate.score > existing.score) {
            *slot = Some(candidate);
        }
    }

    [finance, schema_org, wikidata]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NumericSummary, Quartiles};

    fn amount_stats() -> ColumnStatistics {
        ColumnStatistics {
            count: 1000,
            null_count: 0,
            null_pct: 0.0,
            unique_count: 900,
            unique_pct: 90.0,
            cardinality: 0.9,
            numeric: Some(NumericSummary {
                min: 10.0,
                max: 9999.99,
                mean: 500.0,
                median: 490.0,
                std_dev: 200.0,
                quartiles: Quartiles { q1: 250.0, q2: 490.0, q3: 750.0 },
            }),
            mode: None,
            top_values: Vec::new(),
            string_length: None,
            dominant_patterns: Vec::new(),
            semantic_type: None,
            sampling_strategy: "Analyzed all 1000 rows".to_string(),
        }
    }

    #[test]
    fn amount_column_scores_above_finance_threshold() {
        let cfg = ProfilerConfig::default();
        let stats = amount_stats();
        let [finance, _, _] = best_candidates("amount", InferredType::Float, &stats, &[], &cfg);
        let finance = finance.unwrap();
        assert_eq!(finance.tag, "fibo:MonetaryAmount");
        assert!(finance.score >= cfg.finance_taxonomy_threshold);
    }
}
