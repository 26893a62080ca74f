//! Samplers & online statistics: reservoir sampler (Algorithm R), Welford
//! online mean/variance, and a HyperLogLog cardinality adapter. Exact
//! quantiles are served directly off the numeric reservoir; no separate
//! streaming quantile estimator is needed since the reservoir already
//! bounds memory on its own.

pub mod hyperloglog;
pub mod reservoir;
pub mod welford;

pub use hyperloglog::HyperLogLog;
pub use reservoir::ReservoirSampler;
pub use welford::WelfordAccumulator;

/// Computes a linear-interpolated percentile (0..=100) over a slice that
/// need not be sorted; the caller pays the sort cost once per call. Used
/// by the statistics calculator against bounded reservoirs, never against
/// the full unbounded column.
pub fn percentile(sorted_values: &[f64], pct: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }
    let rank = (pct / 100.0) * (sorted_values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_values[lo];
    }
    let frac = rank - lo as f64;
    sorted_values[lo] * (1.0 - frac) + sorted_values[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_sorted_uniform_data() {
        let v: Vec<f64> = (1..=101).map(f64::from).collect();
        assert!((percentile(&v, 50.0) - 51.0).abs() < 1e-9);
        assert!((percentile(&v, 0.0) - 1.0).abs() < 1e-9);
        assert!((percentile(&v, 100.0) - 101.0).abs() < 1e-9);
    }
}
