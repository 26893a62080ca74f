//! Streaming, memory-bounded profiler for chunked tabular data.
//!
//! Ingests column-major row batches from an external [`source::ChunkSource`]
//! and, in a single streaming pass, produces a per-column profile with
//! inferred type, distributional statistics, quality scores, semantic
//! tagging, cross-column correlations, and a ranked validation rule set.
//!
//! ## Pipeline
//!
//! `ChunkSource` → `ColumnAccumulator` (per chunk) → `MemoryGovernor`
//! (periodic) → finalize → type inference → statistics → semantic tagging
//! → context discovery → contextual validation → correlation engine →
//! quality scoring → validation suggestions → `ProfileResult`.

pub mod accumulator;
pub mod column_intelligence;
pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod memory_governor;
pub mod profiler;
pub mod quality;
pub mod sampling;
pub mod semantic;
pub mod source;
pub mod statistics;
pub mod type_inference;
pub mod types;
pub mod validation;

pub use config::ProfilerConfig;
pub use error::{MemorySnapshot, ProfilerError};
pub use profiler::Profiler;
pub use source::{Chunk, ChunkSource, ColumnView, InMemoryChunkSource, RawValue};
pub use types::ProfileResult;

/// Installs a default `tracing` subscriber honoring `RUST_LOG`, falling
/// back to `info`. Convenience for callers embedding this crate as a
/// standalone tool; does nothing for callers who already manage their own
/// subscriber (a second call to `set_global_default` is simply ignored).
pub fn init_default_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}
