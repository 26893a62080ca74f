//! Periodic RSS / system-memory probe. A circuit breaker, never a pause:
//! the governor is consulted between chunks and either logs a warning or
//! aborts the run, but it never blocks accumulation.

use tracing::warn;

use crate::config::ProfilerConfig;
use crate::error::{MemorySnapshot, ProfilerError};

/// Swappable so tests can drive deterministic RSS/availability numbers
/// instead of reading `/proc`.
pub trait MemoryProbe {
    /// Returns `(rss_bytes, total_bytes, available_bytes)`.
    fn read(&mut self) -> (u64, u64, u64);
}

/// Reads `/proc/self/statm` for RSS and `/proc/meminfo` for system-wide
/// totals. Linux-only; falls back to zeros (which never trips a threshold)
/// if the files are unreadable, since a governor failure must not itself
/// be fatal to the profile.
#[derive(Default)]
pub struct ProcMemoryProbe {
    page_size: u64,
}

impl ProcMemoryProbe {
    pub fn new() -> Self {
        Self {
            page_size: 4096,
        }
    }

    fn read_statm_rss(&self) -> Option<u64> {
        let text = std::fs::read_to_string("/proc/self/statm").ok()?;
        let resident_pages: u64 = text.split_whitespace().nth(1)?.parse().ok()?;
        Some(resident_pages * self.page_size)
    }

    fn read_meminfo(&self) -> Option<(u64, u64)> {
        let text = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut total_kb = None;
        let mut avail_kb = None;
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                total_kb = rest.trim().split_whitespace().next()?.parse::<u64>().ok();
            } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                avail_kb = rest.trim().split_whitespace().next()?.parse::<u64>().ok();
            }
        }
        Some((total_kb? * 1024, avail_kb? * 1024))
    }
}

impl MemoryProbe for ProcMemoryProbe {
    fn read(&mut self) -> (u64, u64, u64) {
        let rss = self.read_statm_rss().unwrap_or(0);
        let (total, avail) = self.read_meminfo().unwrap_or((0, 0));
        (rss, total, avail)
    }
}

pub struct MemoryGovernor<P: MemoryProbe> {
    probe: P,
    check_interval: u64,
    warn_pct: f64,
    critical_pct: f64,
    chunks_since_check: u64,
}

impl<P: MemoryProbe> MemoryGovernor<P> {
    pub fn new(probe: P, config: &ProfilerConfig) -> Self {
        Self {
            probe,
            check_interval: config.memory_check_interval.max(1),
            warn_pct: config.memory_warn_pct,
            critical_pct: config.memory_critical_pct,
            chunks_since_check: 0,
        }
    }

    /// Call once per chunk processed. Only probes every `check_interval`
    /// calls; cheap no-op otherwise.
    pub fn tick(&mut self, rows_processed: u64) -> Result<(), ProfilerError> {
        self.chunks_since_check += 1;
        if self.chunks_since_check < self.check_interval {
            return Ok(());
        }
        self.chunks_since_check = 0;

        let (rss, total, avail) = self.probe.read();
        if total == 0 {
            return Ok(());
        }
        let used_pct = 100.0 * (total.saturating_sub(avail)) as f64 / total as f64;

        if used_pct >= self.critical_pct {
            return Err(ProfilerError::ResourceExhausted {
                rows_processed,
                snapshot: MemorySnapshot {
                    rss_bytes: rss,
                    avail_bytes: avail,
                },
            });
        }
        if used_pct >= self.warn_pct {
            warn!(rows_processed, rss_bytes = rss, avail_bytes = avail, used_pct, "memory usage high");
        }
        Ok(())
    }
}
