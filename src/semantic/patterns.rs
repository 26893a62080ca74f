//! Regex pattern detector: runs independently of the taxonomy matcher
//! over sample values, looking for well-known value shapes (email, SSN,
//! credit card, ...). Drives [`crate::types::PatternInfo`] and
//! contributes a PII flag gated by the column name's "unlikely PII" list.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::ProfilerConfig;
use crate::types::PiiPatternType;

const UNLIKELY_PII_NAMES: &[&str] = &[
    "id", "amount", "count", "total", "quantity", "price", "date", "time", "year", "month", "day",
    "score", "rating", "value",
];

struct PatternDef {
    kind: PiiPatternType,
    pattern: &'static str,
    pii: bool,
}

fn definitions() -> &'static [PatternDef] {
    static DEFS: OnceLock<Vec<PatternDef>> = OnceLock::new();
    DEFS.get_or_init(|| {
        vec![
            PatternDef { kind: PiiPatternType::Email, pattern: r"^[^@\s]+@[^@\s]+\.[^@\s]+$", pii: true },
            PatternDef { kind: PiiPatternType::Ssn, pattern: r"^\d{3}-\d{2}-\d{4}$", pii: true },
            PatternDef {
                kind: PiiPatternType::CreditCard,
                pattern: r"^(\d{4}[- ]?){3}\d{4}$",
                pii: true,
            },
            PatternDef {
                kind: PiiPatternType::Uuid,
                pattern: r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
                pii: false,
            },
            PatternDef {
                kind: PiiPatternType::Phone,
                pattern: r"^\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}$",
                pii: true,
            },
            PatternDef {
                kind: PiiPatternType::PhoneIntl,
                pattern: r"^\+\d{1,3}[-.\s]?\(?\d{1,4}\)?([-.\s]?\d{2,4}){2,4}$",
                pii: true,
            },
            PatternDef { kind: PiiPatternType::Zipcode, pattern: r"^\d{5}(-\d{4})?$", pii: false },
            PatternDef {
                kind: PiiPatternType::Url,
                pattern: r"^https?://[^\s]+$",
                pii: false,
            },
            PatternDef {
                kind: PiiPatternType::Ipv4,
                pattern: r"^(\d{1,3}\.){3}\d{1,3}$",
                pii: false,
            },
            PatternDef {
                kind: PiiPatternType::Currency,
                pattern: r"^[$€£]\s?\d+(\.\d{2})?$",
                pii: false,
            },
        ]
    })
}

fn compiled(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

pub struct PatternDetection {
    pub kind: PiiPatternType,
    pub match_rate: f64,
    pub is_pii_candidate: bool,
}

fn is_unlikely_pii_name(column_name: &str) -> bool {
    let lower = column_name.to_lowercase();
    UNLIKELY_PII_NAMES.iter().any(|n| lower.contains(n))
}

/// Runs every pattern against the sample values and returns the
/// best-matching pattern whose match rate clears the configured
/// threshold, if any.
pub fn detect(column_name: &str, samples: &[String], config: &ProfilerConfig) -> Option<PatternDetection> {
    if samples.is_empty() {
        return None;
    }
    let mut best: Option<(PiiPatternType, f64, bool)> = None;
    for def in definitions() {
        let re = compiled(def.pattern);
        let hits = samples.iter().filter(|s| re.is_match(s.trim())).count();
        let rate = hits as f64 / samples.len() as f64;
        if rate < config.pattern_match_rate_threshold {
            continue;
        }
        if best.as_ref().map_or(true, |(_, best_rate, _)| rate > *best_rate) {
            best = Some((def.kind, rate, def.pii));
        }
    }

    best.map(|(kind, rate, pii)| {
        let is_pii_candidate = pii
            && matches!(
                kind,
                PiiPatternType::Email | PiiPatternType::Phone | PiiPatternType::PhoneIntl | PiiPatternType::Ssn | PiiPatternType::CreditCard
            )
            && !is_unlikely_pii_name(column_name);
        PatternDetection {
            kind,
            match_rate: rate,
            is_pii_candidate,
        }
    })
}
