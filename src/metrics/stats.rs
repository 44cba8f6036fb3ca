use hdrhistogram::Histogram;

// ─── Histogram range ─────────────────────────────────────────────

/// 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Latency statistics ──────────────────────────────────────────

/// Full statistical breakdown of one group of response times.
/// All values are in seconds.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub count: u64,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl LatencyStats {
    /// Compute stats from raw response times (seconds).
    /// Returns `None` for an empty group; callers render "no data"
    /// instead of dividing by zero.
    pub fn from_times(times: &[f64]) -> Option<Self> {
        if times.is_empty() {
            return None;
        }

        let n = times.len() as f64;
        let mean = times.iter().sum::<f64>() / n;

        // Sample standard deviation, zero for a single observation
        let variance = if times.len() > 1 {
            times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let stddev = variance.sqrt();

        // Quantiles come from an HdrHistogram over microseconds,
        // clamped into its recordable range.
        let mut hist = Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
            .expect("histogram creation");
        for t in times {
            let us = (t * 1_000_000.0) as u64;
            let _ = hist.record(us.clamp(HIST_LOW, HIST_HIGH));
        }

        let secs = |us: u64| us as f64 / 1_000_000.0;
        Some(Self {
            count: times.len() as u64,
            mean,
            stddev,
            min: secs(hist.min()),
            p25: secs(hist.value_at_quantile(0.25)),
            p50: secs(hist.value_at_quantile(0.50)),
            p75: secs(hist.value_at_quantile(0.75)),
            max: secs(hist.max()),
        })
    }
}

// ─── Derived metrics ─────────────────────────────────────────────

/// Cache speedup percentage: how much faster the cached fetches were
/// relative to the first, uncached one.
///
/// `(mean_nocache − mean_cached) / mean_nocache × 100`
///
/// Undefined (`None`) when either group is empty or the nocache mean
/// is zero; the report prints "no data" for that case.
pub fn cache_speedup_pct(nocache_times: &[f64], cached_times: &[f64]) -> Option<f64> {
    let nocache = LatencyStats::from_times(nocache_times)?;
    let cached = LatencyStats::from_times(cached_times)?;
    if nocache.mean <= 0.0 {
        return None;
    }
    Some((nocache.mean - cached.mean) / nocache.mean * 100.0)
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_has_no_stats() {
        assert!(LatencyStats::from_times(&[]).is_none());
    }

    #[test]
    fn single_sample_has_zero_stddev() {
        let stats = LatencyStats::from_times(&[0.25]).unwrap();
        assert_eq!(stats.count, 1);
        assert!((stats.mean - 0.25).abs() < 1e-9);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn mean_and_stddev_match_known_values() {
        // mean 3.0, sample variance 2.5 → stddev ≈ 1.5811
        let stats = LatencyStats::from_times(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert!((stats.stddev - 2.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn quantiles_are_ordered_and_bounded() {
        let stats = LatencyStats::from_times(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]).unwrap();
        assert!(stats.min <= stats.p25);
        assert!(stats.p25 <= stats.p50);
        assert!(stats.p50 <= stats.p75);
        assert!(stats.p75 <= stats.max);
        // 3-sigfig histogram keeps values within 0.1 % of the input
        assert!((stats.min - 0.1).abs() < 0.001);
        assert!((stats.max - 0.8).abs() < 0.001);
    }

    #[test]
    fn speedup_for_2s_miss_and_half_second_hit_is_75_pct() {
        let pct = cache_speedup_pct(&[2.0], &[0.5]).unwrap();
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn speedup_is_undefined_without_nocache_samples() {
        assert!(cache_speedup_pct(&[], &[0.5]).is_none());
        assert!(cache_speedup_pct(&[2.0], &[]).is_none());
        assert!(cache_speedup_pct(&[0.0], &[0.0]).is_none());
    }
}
