//! Profile Result Assembler: the top-level orchestrator. Owns the
//! accumulators while streaming; at finalize they are consumed into the
//! derived per-column profiles, correlations, context validation, and
//! validation suggestions that make up a [`ProfileResult`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::accumulator::ColumnAccumulator;
use crate::config::ProfilerConfig;
use crate::context::{self, RowSampleStore};
use crate::error::ProfilerError;
use crate::memory_governor::{MemoryGovernor, MemoryProbe, ProcMemoryProbe};
use crate::quality;
use crate::correlation;
use crate::semantic;
use crate::source::{ChunkSource, RawValue};
use crate::statistics;
use crate::type_inference;
use crate::types::{ColumnProfile, InferredType, ProfileResult};
use crate::validation;

pub struct Profiler {
    config: ProfilerConfig,
}

impl Profiler {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn run(&mut self, source: &mut dyn ChunkSource, cancel: &AtomicBool, source_identity: &str) -> Result<ProfileResult, ProfilerError> {
        self.run_with_probe(source, cancel, source_identity, ProcMemoryProbe::new())
    }

    pub fn run_with_probe<P: MemoryProbe>(
        &mut self,
        source: &mut dyn ChunkSource,
        cancel: &AtomicBool,
        source_identity: &str,
        probe: P,
    ) -> Result<ProfileResult, ProfilerError> {
        let start = Instant::now();
        let mut governor = MemoryGovernor::new(probe, &self.config);

        let mut column_names: Option<Vec<String>> = None;
        let mut accumulators: Vec<ColumnAccumulator> = Vec::new();
        let mut row_store: Option<RowSampleStore> = None;
        let mut rows_processed: u64 = 0;

        info!("profiler starting");

        while let Some(chunk) = source.next_chunk().map_err(|e| match e {
            ProfilerError::SourceFailure { message, .. } => ProfilerError::SourceFailure {
                rows_processed,
                message,
            },
            other => other,
        })? {
            if cancel.load(Ordering::Relaxed) {
                info!(rows_processed, "cancellation requested");
                return Err(ProfilerError::Cancelled { rows_processed });
            }

            match &column_names {
                None => {
                    column_names = Some(chunk.column_names.clone());
                    accumulators = chunk
                        .column_names
                        .iter()
                        .enumerate()
                        .map(|(idx, name)| ColumnAccumulator::new(name, idx, None, &self.config))
                        .collect();
                    row_store = Some(RowSampleStore::new(chunk.column_names.clone(), self.config.n_sample));
                }
                Some(expected) => {
                    if expected != &chunk.column_names {
                        return Err(ProfilerError::BadChunkSchema {
                            expected: expected.clone(),
                            actual: chunk.column_names.clone(),
                        });
                    }
                }
            }

            debug!(rows = chunk.row_count, "processing chunk");

            for (idx, acc) in accumulators.iter_mut().enumerate() {
                if let Some(view) = chunk.column_at(idx) {
                    acc.process_chunk(view, &self.config);
                }
            }

            if let Some(store) = row_store.as_mut() {
                if !store.is_full() {
                    for row in 0..chunk.row_count {
                        if store.is_full() {
                            break;
                        }
                        let values: Vec<Option<String>> = (0..chunk.column_names.len())
                            .map(|idx| match chunk.column_at(idx).map(|v| v.raw(row)) {
                                Some(RawValue::Null) | None => None,
                                Some(RawValue::Str(s)) => Some(s.to_string()),
                                Some(RawValue::Int(i)) => Some(i.to_string()),
                                Some(RawValue::Float(f)) => Some(f.to_string()),
                                Some(RawValue::Bool(b)) => Some(b.to_string()),
                            })
                            .collect();
                        store.push_row(values);
                    }
                }
            }

            rows_processed += chunk.row_count as u64;
            governor.tick(rows_processed)?;
        }

        let row_store = row_store.unwrap_or_default();

        // Finalize: type inference -> statistics -> semantic tagging ->
        // quality scoring, per column, in schema order.
        let mut columns: Vec<ColumnProfile> = Vec::with_capacity(accumulators.len());
        for acc in &accumulators {
            let type_inference = type_inference::infer(acc);
            let mut stats = statistics::compute(acc, type_inference.inferred_type, &self.config);
            let (semantic_info, pattern_info) = semantic::tag_column(
                &acc.column_name,
                type_inference.inferred_type,
                &stats,
                &acc.sample_values,
                &self.config,
            );
            stats.semantic_type = semantic_info.primary_tag.clone();
            let quality_metrics = quality::score(&type_inference, &stats);

            columns.push(ColumnProfile {
                name: acc.column_name.clone(),
                type_inference,
                statistics: stats,
                quality: quality_metrics,
                semantic: semantic_info,
                pattern: pattern_info,
            });
        }

        // Categorical / numeric classification for context discovery,
        // per the component design's rule.
        let categorical_columns: Vec<String> = columns
            .iter()
            .filter(|c| {
                let unique = c.statistics.unique_count;
                matches!(c.type_inference.inferred_type, InferredType::String)
                    || (c.type_inference.inferred_type == InferredType::Integer && (2..=self.config.max_categorical_unique as u64).contains(&unique))
            })
            .map(|c| c.name.clone())
            .collect();

        let numeric_columns: Vec<String> = columns
            .iter()
            .filter(|c| {
                let unique = c.statistics.unique_count;
                c.type_inference.inferred_type == InferredType::Float
                    || (c.type_inference.inferred_type == InferredType::Integer && unique > 10)
            })
            .map(|c| c.name.clone())
            .collect();

        let subgroup_patterns = context::discover_subgroups(&row_store, &categorical_columns, &numeric_columns, &self.config);
        let correlation_patterns = context::discover_correlation_patterns(&row_store, &numeric_columns, &self.config);
        let outlier_candidates = context::find_outlier_candidates(&row_store, &numeric_columns);
        let context_validation = context::validate_candidates(&row_store, &outlier_candidates, &subgroup_patterns, &correlation_patterns, &self.config);

        let numeric_accumulators: Vec<(&str, &ColumnAccumulator)> = accumulators
            .iter()
            .filter(|acc| numeric_columns.iter().any(|n| n == &acc.column_name))
            .map(|acc| (acc.column_name.as_str(), acc))
            .collect();
        let correlations = correlation::compute_all(&numeric_accumulators, &self.config);

        let mut suggestions = validation::suggest_for_dataset(rows_processed);
        for column in &columns {
            suggestions.extend(validation::suggest_for_column(column, rows_processed));
        }
        let suggestions = validation::sort_by_confidence(suggestions);

        let overall_quality_score = if columns.is_empty() {
            0.0
        } else {
            columns.iter().map(|c| c.quality.overall_score).sum::<f64>() / columns.len() as f64
        };

        let column_count = columns.len();
        info!(rows_processed, column_count, "profiler finished");

        let privacy_risk = semantic::dataset_privacy_risk(
            &columns.iter().map(|c| (c.name.as_str(), &c.pattern)).collect::<Vec<_>>(),
        );

        Ok(ProfileResult {
            source_identity: source_identity.to_string(),
            size_bytes: None,
            format: None,
            row_count: rows_processed,
            column_count,
            produced_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            columns,
            correlations,
            suggestions,
            overall_quality_score,
            context_validation: context_validation.into_iter().collect::<HashMap<_, _>>(),
            privacy_risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Chunk, ColumnView, InMemoryChunkSource};

    fn probe_always_low() -> impl MemoryProbe {
        struct Low;
        impl MemoryProbe for Low {
            fn read(&mut self) -> (u64, u64, u64) {
                (1_000, 1_000_000, 900_000)
            }
        }
        Low
    }

    #[test]
    fn clean_three_column_dataset_matches_scenario_s1() {
        let ids: Vec<Option<i64>> = (1..=1000).map(Some).collect();
        let amounts: Vec<Option<f64>> = (1..=1000).map(|i| Some(10.0 + i as f64 * 8.99)).collect();
        let statuses: Vec<Option<String>> = (1..=1000)
            .map(|i| Some(if i % 2 == 0 { "active".to_string() } else { "closed".to_string() }))
            .collect();

        let chunk = Chunk::new(
            vec!["id".into(), "amount".into(), "status".into()],
            vec![ColumnView::Integers(ids), ColumnView::Floats(amounts), ColumnView::Strings(statuses)],
        );
        let mut source = InMemoryChunkSource::new(vec![chunk]);
        let mut profiler = Profiler::new(ProfilerConfig::default());
        let cancel = AtomicBool::new(false);
        let result = profiler
            .run_with_probe(&mut source, &cancel, "test", probe_always_low())
            .unwrap();

        assert_eq!(result.row_count, 1000);
        assert_eq!(result.column_count, 3);

        let id_col = result.columns.iter().find(|c| c.name == "id").unwrap();
        assert!((id_col.statistics.cardinality - 1.0).abs() < 0.05);

        let status_col = result.columns.iter().find(|c| c.name == "status").unwrap();
        assert!(status_col
            .statistics
            .top_values
            .iter()
            .any(|v| v.value == "active" || v.value == "closed"));
    }

    #[test]
    fn cancellation_stops_mid_stream_and_reports_rows_processed() {
        let chunk1 = Chunk::new(
            vec!["x".into()],
            vec![ColumnView::Integers((0..500).map(Some).collect())],
        );
        let chunk2 = Chunk::new(
            vec!["x".into()],
            vec![ColumnView::Integers((500..1000).map(Some).collect())],
        );
        let mut source = InMemoryChunkSource::new(vec![chunk1, chunk2]);
        let mut profiler = Profiler::new(ProfilerConfig::default());
        let cancel = AtomicBool::new(false);
        cancel.store(true, Ordering::Relaxed);
        let result = profiler.run_with_probe(&mut source, &cancel, "test", probe_always_low());
        assert!(matches!(result, Err(ProfilerError::Cancelled { .. })));
    }

    #[test]
    fn schema_mismatch_between_chunks_is_fatal() {
        let chunk1 = Chunk::new(vec!["a".into()], vec![ColumnView::Integers(vec![Some(1)])]);
        let chunk2 = Chunk::new(vec!["b".into()], vec![ColumnView::Integers(vec![Some(2)])]);
        let mut source = InMemoryChunkSource::new(vec![chunk1, chunk2]);
        let mut profiler = Profiler::new(ProfilerConfig::default());
        let cancel = AtomicBool::new(false);
        let result = profiler.run_with_probe(&mut source, &cancel, "test", probe_always_low());
        assert!(matches!(result, Err(ProfilerError::BadChunkSchema { .. })));
    }
}
