//! Error kinds the profiling core can return. All are fatal: when one is
//! produced no `ProfileResult` is emitted for the run.

use thiserror::Error;

/// Snapshot of memory usage taken by the memory governor when it trips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySnapshot {
    pub rss_bytes: u64,
    pub avail_bytes: u64,
}

#[derive(Debug, Error)]
pub enum ProfilerError {
    /// The chunk source raised while producing a batch.
    #[error("chunk source failed after {rows_processed} rows: {message}")]
    SourceFailure {
        rows_processed: u64,
        message: String,
    },

    /// Memory governor tripped the critical threshold.
    #[error(
        "memory exhausted after {rows_processed} rows (rss={} bytes, avail={} bytes)",
        snapshot.rss_bytes, snapshot.avail_bytes
    )]
    ResourceExhausted {
        rows_processed: u64,
        snapshot: MemorySnapshot,
    },

    /// A later chunk's column-name list disagreed with the first chunk.
    #[error("chunk schema mismatch: expected {expected:?}, got {actual:?}")]
    BadChunkSchema {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Caller requested cancellation between chunks.
    #[error("cancelled after {rows_processed} rows")]
    Cancelled { rows_processed: u64 },

    /// A defensive invariant check failed; this indicates a bug in the
    /// profiler itself, not bad input.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

/// Errors raised by the taxonomy/config loading helpers. Kept separate from
/// `ProfilerError` since these surface at construction time, not mid-run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}
