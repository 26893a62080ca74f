//! Enhanced code-like detection: runs before taxonomy matching for
//! string-typed columns. Recognizes ticket identifiers, cabin/seat
//! codes, short category codes, and generic identifiers that would
//! otherwise fall through to a generic `schema:Text` match.

use crate::types::ColumnStatistics;

pub struct CodeDetection {
    pub tag: &'static str,
    pub confidence: f64,
}

fn is_alphanumeric_with_digit_and_separator(s: &str) -> bool {
    let has_digit = s.chars().any(|c| c.is_ascii_digit());
    let has_separator = s.chars().any(|c| c == '-' || c == '_' || c == '/');
    let alphanumeric_or_sep = s.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/');
    has_digit && has_separator && alphanumeric_or_sep
}

fn is_letter_digit_pattern(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && s.chars().skip(1).all(|c| c.is_ascii_digit())
}

fn is_short_uppercase_code(s: &str) -> bool {
    (1..=4).contains(&s.chars().count()) && s.chars().all(|c| c.is_ascii_uppercase())
}

/// Inspects a sample of string values (and the column's cardinality) to
/// decide whether the column looks like a structured code field.
pub fn detect(stats: &ColumnStatistics, samples: &[String]) -> Option<CodeDetection> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;

    let ticket_hits = samples.iter().filter(|s| is_alphanumeric_with_digit_and_separator(s)).count() as f64;
    if stats.cardinality > 0.9 && ticket_hits / n > 0.6 {
        return Some(CodeDetection {
            tag: "code:ticket_identifier",
            confidence: 0.60 + 0.2 * (ticket_hits / n - 0.6).max(0.0),
        });
    }

    let cabin_hits = samples.iter().filter(|s| is_letter_digit_pattern(s)).count() as f64;
    let avg_len = samples.iter().map(|s| s.chars().count()).sum::<usize>() as f64 / n;
    if stats.cardinality > 0.1 && stats.cardinality < 0.9 && avg_len <= 6.0 && cabin_hits / n > 0.5 {
        return Some(CodeDetection {
            tag: "code:cabin_seat",
            confidence: 0.65,
        });
    }

    let category_hits = samples.iter().filter(|s| is_short_uppercase_code(s)).count() as f64;
    if stats.cardinality < 0.1 && category_hits / n > 0.5 {
        return Some(CodeDetection {
            tag: "code:short_category",
            confidence: 0.62,
        });
    }

    let generic_hits = samples
        .iter()
        .filter(|s| s.chars().count() <= 10 && s.chars().all(|c| c.is_ascii_alphanumeric()))
        .count() as f64;
    if stats.cardinality > 0.9 && generic_hits / n > 0.6 {
        return Some(CodeDetection {
            tag: "code:generic_identifier",
            confidence: 0.60,
        });
    }

    None
}
