//! A single typed configuration record for a profiling run. Constructed
//! once by the caller (directly, or via [`ProfilerConfig::from_toml`]) and
//! passed by reference into [`crate::profiler::Profiler`]. Not stored in
//! any process-wide singleton: a profiling run is a single call, not a
//! long-lived service.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Every tunable named across the component design, exposed so defaults
/// can be overridden without touching code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Max distinct keys retained in a column's value-frequency map.
    pub k_freq: usize,
    /// Per-chunk sample size cap feeding the frequency map once it is full.
    pub sample_freq: usize,
    /// Max size of a numeric reservoir (absent a Column Intelligence hint).
    pub k_num_default: usize,
    /// Max size of a string-length reservoir.
    pub k_len: usize,
    /// Max number of raw sample values retained per column.
    pub n_sample: usize,
    /// Max number of non-null values used to build the first-chunk pattern tally.
    pub pattern_tally_sample: usize,

    /// Chunks between memory governor probes.
    pub memory_check_interval: u64,
    /// RSS / system-memory percentage that triggers a warning log.
    pub memory_warn_pct: f64,
    /// RSS / system-memory percentage that aborts the run.
    pub memory_critical_pct: f64,

    /// Reproducibility seed for all reservoir samplers.
    pub seed: u64,

    /// Minimum R² for a subgroup pattern to be reported.
    pub variance_explained_threshold: f64,
    /// Minimum row count within a segment to be considered.
    pub min_segment_size: usize,
    /// Max distinct values for a column to be treated as categorical.
    pub max_categorical_unique: usize,
    /// Minimum |r| for a correlation pattern used in context discovery.
    pub context_correlation_threshold: f64,

    /// Use HyperLogLog as the cardinality estimator once a column's
    /// value-frequency map saturates. When `false`, cardinality falls back
    /// to extrapolating from the tracked-key sample rate instead.
    pub hll_enabled: bool,

    /// Minimum |r| for a CorrelationResult to be emitted.
    pub correlation_threshold: f64,
    /// Columns beyond this count are excluded from correlation entirely.
    pub max_correlation_columns: usize,

    /// Contextual validator: suspicion multiplier applied per matching
    /// strong subgroup pattern (variance-explained >= threshold).
    pub suspicion_strong_subgroup_factor: f64,
    /// Multiplier applied per matching weak subgroup pattern.
    pub suspicion_weak_subgroup_factor: f64,
    /// Multiplier applied per matching correlation pattern.
    pub suspicion_correlation_factor: f64,
    /// Suspicion threshold below which a candidate counts as explained.
    pub suspicion_explained_threshold: f64,
    /// Require at least two corroborating pattern matches to downgrade.
    pub require_multiple_checks: bool,
    /// Segment membership tolerance, in standard deviations.
    pub subgroup_sigma: f64,
    /// Correlation-predicted tolerance multiplier (in residual std units).
    pub correlation_tolerance_sigma: f64,

    /// Taxonomy acceptance thresholds.
    pub finance_taxonomy_threshold: f64,
    pub schema_org_taxonomy_threshold: f64,
    pub wikidata_taxonomy_threshold: f64,
    /// Precedence: finance overrides schema.org when within this margin.
    pub finance_precedence_margin: f64,
    /// Schema.org overrides generic "text" fallback at/above this confidence.
    pub schema_org_text_override_confidence: f64,
    /// Enhanced code-detector overrides schema:Text at/above this confidence,
    /// or when it exceeds the taxonomy score by this margin.
    pub code_detect_override_confidence: f64,
    pub code_detect_override_margin: f64,

    /// Regex pattern detector: minimum match rate among samples.
    pub pattern_match_rate_threshold: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            k_freq: 10_000,
            sample_freq: 10_000,
            k_num_default: 10_000,
            k_len: 10_000,
            n_sample: 100,
            pattern_tally_sample: 100,

            memory_check_interval: 10,
            memory_warn_pct: 75.0,
            memory_critical_pct: 85.0,

            seed: 42,

            variance_explained_threshold: 0.20,
            min_segment_size: 10,
            max_categorical_unique: 20,
            context_correlation_threshold: 0.5,

            hll_enabled: true,

            correlation_threshold: 0.5,
            max_correlation_columns: 20,

            suspicion_strong_subgroup_factor: 0.2,
            suspicion_weak_subgroup_factor: 0.5,
            suspicion_correlation_factor: 0.5,
            suspicion_explained_threshold: 0.5,
            require_multiple_checks: true,
            subgroup_sigma: 2.5,
            correlation_tolerance_sigma: 2.0,

            finance_taxonomy_threshold: 0.50,
            schema_org_taxonomy_threshold: 0.50,
            wikidata_taxonomy_threshold: 0.55,
            finance_precedence_margin: 0.10,
            schema_org_text_override_confidence: 0.60,
            code_detect_override_confidence: 0.60,
            code_detect_override_margin: 0.10,

            pattern_match_rate_threshold: 0.30,
        }
    }
}

impl ProfilerConfig {
    /// Loads a config from a TOML file, falling back to defaults for any
    /// field the file does not set.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML config file from disk.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let cfg = ProfilerConfig::default();
        assert_eq!(cfg.k_freq, 10_000);
        assert_eq!(cfg.n_sample, 100);
        assert!((cfg.variance_explained_threshold - 0.20).abs() < 1e-9);
        assert!((cfg.correlation_threshold - 0.5).abs() < 1e-9);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = ProfilerConfig::from_toml("seed = 7\nk_freq = 500\n").unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.k_freq, 500);
        assert_eq!(cfg.n_sample, ProfilerConfig::default().n_sample);
    }

    #[test]
    fn from_toml_file_reads_and_parses_disk_config() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 123\nmax_categorical_unique = 5").unwrap();
        let cfg = ProfilerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(cfg.seed, 123);
        assert_eq!(cfg.max_categorical_unique, 5);
    }

    #[test]
    fn from_toml_file_reports_io_error_for_missing_path() {
        let result = ProfilerConfig::from_toml_file(std::path::Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
