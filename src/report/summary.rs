use std::fmt::Write as _;

use uuid::Uuid;

use crate::metrics::stats::{cache_speedup_pct, LatencyStats};
use crate::metrics::{Operation, SampleStore};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

// ─── Console summary ─────────────────────────────────────────────

/// Render the full text summary. Pure read of the store; building a
/// `String` keeps the empty-store contract directly testable and lets
/// the caller print it in one piece.
pub fn render_summary(store: &SampleStore, run_id: Uuid) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " PERFORMANCE SUMMARY — run {run_id}");
    let _ = writeln!(out, "{RULE}");

    if store.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, " No samples collected — nothing to report.");
        let _ = writeln!(out, "{RULE}");
        return out;
    }

    let samples = store.samples();
    let span_secs = (samples[samples.len() - 1].timestamp - samples[0].timestamp)
        .num_milliseconds()
        .max(0) as f64
        / 1000.0;
    let _ = writeln!(
        out,
        " Samples: {}   Run span: {:.1} s",
        store.len(),
        span_secs
    );

    cache_section(&mut out, store);
    operations_section(&mut out, store);
    counts_section(&mut out, store);
    error_rate_section(&mut out, store);

    let _ = writeln!(out, "{RULE}");
    out
}

fn cache_section(out: &mut String, store: &SampleStore) {
    let _ = writeln!(out);
    let _ = writeln!(out, " ─── Large object cache analysis ─────────────────────────────");

    let nocache_times = store.times_for(Operation::LargeRequestNoCache);
    let cached_times = store.times_for(Operation::LargeRequestCached);

    match LatencyStats::from_times(&nocache_times) {
        Some(s) => {
            let _ = writeln!(out, "   First request (no cache): {:.4} s", s.mean);
        }
        None => {
            let _ = writeln!(out, "   First request (no cache): no data");
        }
    }

    match LatencyStats::from_times(&cached_times) {
        Some(s) => {
            let _ = writeln!(out, "   Cached requests:");
            let _ = writeln!(out, "     - Average: {:.4} s", s.mean);
            let _ = writeln!(out, "     - Min:     {:.4} s", s.min);
            let _ = writeln!(out, "     - Max:     {:.4} s", s.max);
            let _ = writeln!(out, "     - Std dev: {:.4} s", s.stddev);
        }
        None => {
            let _ = writeln!(out, "   Cached requests: no data");
        }
    }

    match cache_speedup_pct(&nocache_times, &cached_times) {
        Some(pct) => {
            let _ = writeln!(out, "   Cache speedup: {pct:.1}%");
        }
        None => {
            let _ = writeln!(out, "   Cache speedup: no data");
        }
    }
}

fn operations_section(out: &mut String, store: &SampleStore) {
    let _ = writeln!(out);
    let _ = writeln!(out, " ─── Other operations (seconds) ──────────────────────────────");
    let _ = writeln!(
        out,
        "   {:<22} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Operation", "Count", "Mean", "Std", "Min", "P25", "P50", "P75", "Max"
    );

    let mut any = false;
    for (op, group) in store.by_operation() {
        if op.is_large_request() {
            continue;
        }
        let times: Vec<f64> = group.iter().map(|s| s.response_time.as_secs_f64()).collect();
        if let Some(s) = LatencyStats::from_times(&times) {
            any = true;
            let _ = writeln!(
                out,
                "   {:<22} {:>5} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
                op.label(),
                s.count,
                s.mean,
                s.stddev,
                s.min,
                s.p25,
                s.p50,
                s.p75,
                s.max
            );
        }
    }
    if !any {
        let _ = writeln!(out, "   no data");
    }
}

fn counts_section(out: &mut String, store: &SampleStore) {
    let (misses, hits) = store.cache_hit_counts();

    let _ = writeln!(out);
    let _ = writeln!(out, " ─── Sample counts ───────────────────────────────────────────");
    let _ = writeln!(out, "   Cache hits:   {hits}");
    let _ = writeln!(out, "   Cache misses: {misses}");

    for (status, count) in store.status_code_counts() {
        match status {
            Some(code) => {
                let _ = writeln!(out, "   Status {code}: {count}");
            }
            None => {
                let _ = writeln!(out, "   No response: {count}");
            }
        }
    }
}

fn error_rate_section(out: &mut String, store: &SampleStore) {
    let _ = writeln!(out);
    let _ = writeln!(out, " ─── Error rate by operation ─────────────────────────────────");
    for (op, rate) in store.error_rates() {
        let _ = writeln!(out, "   {:<22} {:>6.1}%", op.label(), rate);
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run_id() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn empty_store_renders_an_explicit_empty_report() {
        let store = SampleStore::new();
        let report = render_summary(&store, run_id());
        assert!(report.contains("No samples collected"));
    }

    #[test]
    fn speedup_of_75_pct_shows_in_the_cache_section() {
        let mut store = SampleStore::new();
        store.record(
            Operation::LargeRequestNoCache,
            Duration::from_secs_f64(2.0),
            Some(200),
            false,
        );
        store.record(
            Operation::LargeRequestCached,
            Duration::from_secs_f64(0.5),
            Some(200),
            true,
        );

        let report = render_summary(&store, run_id());
        assert!(report.contains("Cache speedup: 75.0%"));
    }

    #[test]
    fn missing_nocache_group_reports_no_data_instead_of_failing() {
        let mut store = SampleStore::new();
        store.record(
            Operation::LargeRequestCached,
            Duration::from_millis(100),
            Some(200),
            true,
        );

        let report = render_summary(&store, run_id());
        assert!(report.contains("Cache speedup: no data"));
        assert!(report.contains("First request (no cache): no data"));
    }

    #[test]
    fn error_rates_are_listed_per_operation() {
        let mut store = SampleStore::new();
        store.record(Operation::CreateUser, Duration::from_millis(5), Some(201), false);
        store.record(Operation::CreateUser, Duration::from_millis(5), Some(201), false);
        store.record(Operation::CreateUser, Duration::from_millis(5), Some(500), false);

        let report = render_summary(&store, run_id());
        assert!(report.contains("create_user"));
        assert!(report.contains("33.3%"));
    }

    #[test]
    fn non_large_operations_get_a_distribution_row() {
        let mut store = SampleStore::new();
        store.record(Operation::GetUsers, Duration::from_millis(30), Some(200), false);
        store.record(Operation::LargeRequestNoCache, Duration::from_secs(2), Some(200), false);

        let report = render_summary(&store, run_id());
        assert!(report.contains("get_users"));
        // large-request labels stay out of the distribution table
        let table = report
            .split("Other operations")
            .nth(1)
            .unwrap()
            .split("Sample counts")
            .next()
            .unwrap();
        assert!(!table.contains("large_request_nocache"));
    }
}
