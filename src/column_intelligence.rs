//! Column Intelligence advisor: inspects a column *name* with an ordered
//! family of regexes and recommends a reservoir size and a purely
//! advisory semantic hint. The type inferencer, not this advisor, decides
//! the actual inferred type.

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIntelligence {
    pub semantic_hint: String,
    pub recommended_sample_size: usize,
    pub reasoning: String,
}

struct Family {
    semantic_hint: &'static str,
    patterns: &'static [&'static str],
    sample_size: usize,
    reasoning: &'static str,
}

// Order matters: the first matching family wins.
const FAMILIES: &[Family] = &[
    Family {
        semantic_hint: "email",
        patterns: &["(?i)e?mail", "(?i)^contact$"],
        sample_size: 1_000,
        reasoning: "name suggests an email/contact field; small reservoir is enough to detect the pattern",
    },
    Family {
        semantic_hint: "phone",
        patterns: &["(?i)phone", "(?i)mobile", "(?i)tel(ephone)?$"],
        sample_size: 1_000,
        reasoning: "name suggests a phone number field",
    },
    Family {
        semantic_hint: "id",
        patterns: &["(?i)^id$", "(?i)_id$", "(?i)^key$", "(?i)_key$", "(?i)identifier"],
        sample_size: 1_000,
        reasoning: "name suggests an identifier/key field; values are expected to be near-unique",
    },
    Family {
        semantic_hint: "date",
        patterns: &["(?i)date", "(?i)time", "(?i)_at$", "(?i)_on$", "(?i)timestamp"],
        sample_size: 5_000,
        reasoning: "name suggests a date/time field; larger reservoir captures format variety",
    },
    Family {
        semantic_hint: "amount",
        patterns: &["(?i)amount", "(?i)price", "(?i)cost", "(?i)total", "(?i)balance", "(?i)fee"],
        sample_size: 5_000,
        reasoning: "name suggests a monetary amount; larger reservoir improves distribution estimates",
    },
    Family {
        semantic_hint: "category",
        patterns: &["(?i)category", "(?i)type$", "(?i)status", "(?i)flag", "(?i)class"],
        sample_size: 2_000,
        reasoning: "name suggests a low-cardinality categorical field",
    },
    Family {
        semantic_hint: "text",
        patterns: &["(?i)description", "(?i)comment", "(?i)note", "(?i)text", "(?i)^name$"],
        sample_size: 2_000,
        reasoning: "name suggests free text",
    },
    Family {
        semantic_hint: "code",
        patterns: &["(?i)code$", "(?i)^sku$", "(?i)ref(erence)?$"],
        sample_size: 2_000,
        reasoning: "name suggests a structured code field",
    },
];

fn compiled(pattern: &str) -> Regex {
    Regex::new(pattern).expect("family regex must compile")
}

pub fn analyze_column(column_name: &str) -> ColumnIntelligence {
    for family in FAMILIES {
        let hit = family
            .patterns
            .iter()
            .any(|p| compiled(p).is_match(column_name));
        if hit {
            return ColumnIntelligence {
                semantic_hint: family.semantic_hint.to_string(),
                recommended_sample_size: family.sample_size,
                reasoning: family.reasoning.to_string(),
            };
        }
    }
    ColumnIntelligence {
        semantic_hint: "unknown".to_string(),
        recommended_sample_size: 10_000,
        reasoning: "no name pattern matched; defaulting to a conservative reservoir size".to_string(),
    }
}

/// Builds the human-readable disclosure string required by the
/// statistics calculator's `sampling_strategy` field.
pub fn sampling_summary(total_rows: u64, sampled: u64, field_hint: Option<&str>) -> String {
    if sampled >= total_rows {
        return format!("Analyzed all {total_rows} rows");
    }
    let pct = if total_rows == 0 {
        0.0
    } else {
        100.0 * sampled as f64 / total_rows as f64
    };
    match field_hint {
        Some(hint) => format!("Sampled {sampled} of {total_rows} rows ({pct:.1}%) ({hint} field)"),
        None => format!("Sampled {sampled} of {total_rows} rows ({pct:.1}%)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_email_family() {
        let r = analyze_column("contact_email");
        assert_eq!(r.semantic_hint, "email");
        assert_eq!(r.recommended_sample_size, 1_000);
    }

    #[test]
    fn recognizes_id_family() {
        let r = analyze_column("customer_id");
        assert_eq!(r.semantic_hint, "id");
    }

    #[test]
    fn first_matching_family_wins_order() {
        // "email" should win over "text" style hints if both could match.
        let r = analyze_column("email");
        assert_eq!(r.semantic_hint, "email");
    }

    #[test]
    fn unknown_default_for_unrecognized_name() {
        let r = analyze_column("zzz_qux");
        assert_eq!(r.semantic_hint, "unknown");
        assert_eq!(r.recommended_sample_size, 10_000);
    }

    #[test]
    fn sampling_summary_reports_full_scan() {
        assert_eq!(sampling_summary(100, 100, None), "Analyzed all 100 rows");
    }

    #[test]
    fn sampling_summary_reports_percentage() {
        let s = sampling_summary(10_000, 1_000, Some("amount"));
        assert!(s.contains("10.0%"));
        assert!(s.contains("amount field"));
    }
}
