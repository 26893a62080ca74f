//! Pattern / Semantic Tagger: synthesizes a single primary semantic tag
//! with an evidence trail, following the precedence order in the
//! component design: binary-flag short-circuit, enhanced code-like
//! detection, then the finance/schema.org/wikidata taxonomy matchers,
//! with the independent regex pattern detector contributing PII
//! classification alongside.

pub mod code_detect;
pub mod patterns;
pub mod taxonomy;

use crate::config::ProfilerConfig;
use crate::types::{ColumnStatistics, InferredType, PatternInfo, SemanticInfo, TaxonomySource};

const BOOLEAN_PAIRS: &[[&str; 2]] = &[
    ["0", "1"],
    ["y", "n"],
    ["yes", "no"],
    ["true", "false"],
    ["t", "f"],
    ["on", "off"],
    ["active", "inactive"],
    ["enabled", "disabled"],
];

/// Builds a regex from the dominant structural pattern (`structural_pattern`
/// in `accumulator.rs`, e.g. "AAA-9999"): digit placeholders become `\d`,
/// letter placeholders become `[A-Za-z]`, and every other character is
/// escaped as a literal.
fn regex_from_structural_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '9' => out.push_str(r"\d"),
            'A' => out.push_str("[A-Za-z]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

fn binary_flag_match(stats: &ColumnStatistics) -> bool {
    if stats.unique_count != 2 || stats.top_values.len() < 2 {
        return false;
    }
    let a = stats.top_values[0].value.to_lowercase();
    let b = stats.top_values[1].value.to_lowercase();
    BOOLEAN_PAIRS
        .iter()
        .any(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
}

pub fn tag_column(
    column_name: &str,
    inferred_type: InferredType,
    stats: &ColumnStatistics,
    samples: &[String],
    config: &ProfilerConfig,
) -> (SemanticInfo, PatternInfo) {
    // Regex pattern detector runs independently; its result feeds
    // PatternInfo and is one candidate input to the primary tag, but is
    // not itself subject to the taxonomy precedence rules below.
    let pattern_detection = patterns::detect(column_name, samples, config);
    let pattern_info = match &pattern_detection {
        Some(detection) => PatternInfo {
            detected_semantic_type: Some(detection.kind),
            confidence: detection.match_rate,
            generated_regex: stats.dominant_patterns.first().map(|p| regex_from_structural_pattern(&p.pattern)),
            pii_detected: detection.is_pii_candidate,
            pii_types: if detection.is_pii_candidate { vec![detection.kind] } else { Vec::new() },
        },
        None => PatternInfo {
            generated_regex: stats.dominant_patterns.first().map(|p| regex_from_structural_pattern(&p.pattern)),
            ..PatternInfo::default()
        },
    };

    // Binary-flag detection short-circuits everything else.
    if binary_flag_match(stats) {
        let confidence = 0.80 + 0.05 * (stats.count.min(1000) as f64 / 1000.0);
        return (
            SemanticInfo {
                tags: vec!["schema:Boolean".to_string()],
                primary_tag: Some("schema:Boolean".to_string()),
                confidence: confidence.min(0.85),
                evidence: vec!["binary_flag:two_values".to_string()],
                taxonomy_source: TaxonomySource::SchemaOrg,
            },
            pattern_info,
        );
    }

    // Enhanced code-like detection runs before taxonomy for strings.
    let code_candidate = if inferred_type == InferredType::String {
        code_detect::detect(stats, samples)
    } else {
        None
    };

    let [finance, schema_org, wikidata] = taxonomy::best_candidates(column_name, inferred_type, stats, samples, config);

    // Precedence: finance overrides schema.org within the configured
    // margin; schema.org overrides a generic text fallback at/above its
    // override confidence; wikidata only applies when both fail.
    let mut chosen_tag: Option<&str> = None;
    let mut chosen_confidence = 0.0;
    let mut chosen_evidence: Vec<String> = Vec::new();
    let mut chosen_source = TaxonomySource::None;

    match (&finance, &schema_org) {
        (Some(f), Some(s)) => {
            if f.score + config.finance_precedence_margin >= s.score {
                chosen_tag = Some(f.tag);
                chosen_confidence = f.score;
                chosen_evidence = f.evidence.clone();
                chosen_source = TaxonomySource::Finance;
            } else {
                chosen_tag = Some(s.tag);
                chosen_confidence = s.score;
                chosen_evidence = s.evidence.clone();
                chosen_source = TaxonomySource::SchemaOrg;
            }
        }
        (Some(f), None) => {
            chosen_tag = Some(f.tag);
            chosen_confidence = f.score;
            chosen_evidence = f.evidence.clone();
            chosen_source = TaxonomySource::Finance;
        }
        (None, Some(s)) => {
            chosen_tag = Some(s.tag);
            chosen_confidence = s.score;
            chosen_evidence = s.evidence.clone();
            chosen_source = TaxonomySource::SchemaOrg;
        }
        (None, None) => {}
    }

    if chosen_tag.is_none() {
        if let Some(w) = &wikidata {
            chosen_tag = Some(w.tag);
            chosen_confidence = w.score;
            chosen_evidence = w.evidence.clone();
            chosen_source = TaxonomySource::Wikidata;
        }
    }

    // Code detector overrides a generic schema:Text fallback.
    if chosen_tag == Some("schema:Text") || chosen_tag.is_none() {
        if let Some(code) = &code_candidate {
            let exceeds_margin = chosen_tag.is_none()
                || code.confidence >= config.code_detect_override_confidence
                || code.confidence - chosen_confidence > config.code_detect_override_margin;
            if exceeds_margin {
                chosen_tag = Some(code.tag);
                chosen_confidence = code.confidence;
                chosen_evidence = vec!["code_detector".to_string()];
                chosen_source = TaxonomySource::CodeDetector;
            }
        }
    }

    // Schema.org generic text is itself only kept when at/above its
    // override confidence; otherwise fall back to the pattern detector's
    // candidate semantic type, if any.
    if chosen_tag == Some("schema:Text") && chosen_confidence < config.schema_org_text_override_confidence {
        if let Some(detection) = &pattern_detection {
            chosen_tag = None;
            chosen_confidence = detection.match_rate;
            chosen_evidence = vec![format!("value_regex:{:?}", detection.kind)];
            chosen_source = TaxonomySource::PatternDetector;
        }
    }

    let tags: Vec<String> = chosen_tag.map(std::string::ToString::to_string).into_iter().collect();

    (
        SemanticInfo {
            tags: tags.clone(),
            primary_tag: tags.into_iter().next(),
            confidence: chosen_confidence,
            evidence: chosen_evidence,
            taxonomy_source: chosen_source,
        },
        pattern_info,
    )
}

/// High-sensitivity pattern kinds: their presence alone is enough to push
/// the dataset-level risk to `High` regardless of how many columns match.
const HIGH_SENSITIVITY_TYPES: &[crate::types::PiiPatternType] = &[
    crate::types::PiiPatternType::Ssn,
    crate::types::PiiPatternType::CreditCard,
];

/// Rolls the per-column PII detections already computed by `tag_column`
/// up into a single dataset-level risk summary. Performs no new
/// detection of its own.
pub fn dataset_privacy_risk(columns: &[(&str, &PatternInfo)]) -> crate::types::DatasetPrivacyRisk {
    let mut columns_with_pii = Vec::new();
    let mut high_sensitivity_types = Vec::new();

    for (name, pattern) in columns {
        if !pattern.pii_detected {
            continue;
        }
        columns_with_pii.push((*name).to_string());
        for kind in &pattern.pii_types {
            if HIGH_SENSITIVITY_TYPES.contains(kind) && !high_sensitivity_types.contains(kind) {
                high_sensitivity_types.push(*kind);
            }
        }
    }

    let risk_level = if !high_sensitivity_types.is_empty() {
        crate::types::PrivacyRiskLevel::High
    } else if columns_with_pii.len() > 1 {
        crate::types::PrivacyRiskLevel::Moderate
    } else if !columns_with_pii.is_empty() {
        crate::types::PrivacyRiskLevel::Low
    } else {
        crate::types::PrivacyRiskLevel::None
    };

    crate::types::DatasetPrivacyRisk {
        columns_with_pii,
        high_sensitivity_types,
        risk_level,
    }
}
