//! The data model: the entities a finished profile is made of. Derived
//! entities are immutable once produced; each replaces a polymorphic,
//! optional-everywhere record with an explicit typed shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    String,
    Empty,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConflict {
    pub inferred_type: InferredType,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInference {
    pub declared_type: Option<InferredType>,
    pub inferred_type: InferredType,
    pub confidence: f64,
    pub is_known: bool,
    pub conflicts: Vec<TypeConflict>,
    pub sample_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFrequency {
    pub value: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFrequency {
    pub pattern: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub quartiles: Quartiles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StringLengthSummary {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub count: u64,
    pub null_count: u64,
    pub null_pct: f64,
    pub unique_count: u64,
    pub unique_pct: f64,
    pub cardinality: f64,
    pub numeric: Option<NumericSummary>,
    pub mode: Option<ValueFrequency>,
    pub top_values: Vec<ValueFrequency>,
    pub string_length: Option<StringLengthSummary>,
    pub dominant_patterns: Vec<PatternFrequency>,
    /// Advisory only, set by the Column Intelligence advisor / tagger.
    pub semantic_type: Option<String>,
    pub sampling_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityMetrics {
    pub completeness: f64,
    pub validity: f64,
    pub uniqueness: f64,
    pub consistency: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
    pub observations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomySource {
    Finance,
    SchemaOrg,
    Wikidata,
    PatternDetector,
    CodeDetector,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticInfo {
    pub tags: Vec<String>,
    pub primary_tag: Option<String>,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub taxonomy_source: TaxonomySource,
}

impl Default for SemanticInfo {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            primary_tag: None,
            confidence: 0.0,
            evidence: Vec::new(),
            taxonomy_source: TaxonomySource::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiPatternType {
    Email,
    Phone,
    PhoneIntl,
    Ssn,
    CreditCard,
    Url,
    Uuid,
    Ipv4,
    Zipcode,
    Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternInfo {
    pub detected_semantic_type: Option<PiiPatternType>,
    pub confidence: f64,
    pub generated_regex: Option<String>,
    pub pii_detected: bool,
    pub pii_types: Vec<PiiPatternType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    Kendall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Moderate,
    Strong,
    VeryStrong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub column1: String,
    pub column2: String,
    pub coefficient: f64,
    pub method: CorrelationMethod,
    pub strength: CorrelationStrength,
    pub p_value: Option<f64>,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub segment_value: String,
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupPattern {
    pub segment_column: String,
    pub value_column: String,
    pub variance_explained: f64,
    pub segments: Vec<SegmentStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPattern {
    pub column_x: String,
    pub column_y: String,
    pub r: f64,
    pub slope: f64,
    pub intercept: f64,
    pub residual_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierExplanation {
    pub column: String,
    pub row_hint: Option<u64>,
    pub value: f64,
    pub reasons: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextValidationResult {
    pub column: String,
    pub candidates: u64,
    pub validated_outliers: u64,
    pub explained: u64,
    pub sample_explanations: Vec<OutlierExplanation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationKind {
    EmptyFileCheck,
    RowCountRangeCheck { min: u64, max: u64 },
    MandatoryFieldCheck { column: String },
    RangeCheck { column: String, min: f64, max: f64 },
    ValidValuesCheck { column: String, values: Vec<String> },
    UniqueKeyCheck { column: String },
    DateFormatCheck { column: String, format: String },
    RegexCheck { column: String, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSuggestion {
    pub kind: ValidationKind,
    pub severity: Severity,
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub type_inference: TypeInference,
    pub statistics: ColumnStatistics,
    pub quality: QualityMetrics,
    pub semantic: SemanticInfo,
    pub pattern: PatternInfo,
}

/// Dataset-level rollup of the per-column PII detection already performed
/// by the pattern detector (`semantic::patterns`). Not a new detection
/// pass: it summarizes `PatternInfo::pii_detected`/`pii_types` across
/// every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyRiskLevel {
    None,
    Low,
    Moderate,
    High,
}

impl Default for PrivacyRiskLevel {
    fn default() -> Self {
        PrivacyRiskLevel::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetPrivacyRisk {
    pub columns_with_pii: Vec<String>,
    pub high_sensitivity_types: Vec<PiiPatternType>,
    pub risk_level: PrivacyRiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub source_identity: String,
    pub size_bytes: Option<u64>,
    pub format: Option<String>,
    pub row_count: u64,
    pub column_count: usize,
    pub produced_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub columns: Vec<ColumnProfile>,
    pub correlations: Vec<CorrelationResult>,
    pub suggestions: Vec<ValidationSuggestion>,
    pub overall_quality_score: f64,
    pub context_validation: HashMap<String, ContextValidationResult>,
    pub privacy_risk: DatasetPrivacyRisk,
}

impl ProfileResult {
    /// Looks up a column's profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Compact JSON rendering for machine consumption (logs, pipelines).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Pretty-printed JSON rendering for reports and debugging.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
