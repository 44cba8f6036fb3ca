use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;

use super::{Operation, Sample};

// ─── Sample store ────────────────────────────────────────────────

/// Append-only record of every observed request, in completion order.
///
/// Owned by the single thread of execution: the connectivity check and
/// scenario runner borrow it mutably to record, reporting borrows it
/// immutably to aggregate. No interior mutability, no locking.
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation, stamped with the current wall-clock time.
    pub fn record(
        &mut self,
        operation: Operation,
        response_time: Duration,
        status_code: Option<u16>,
        cache_hit: bool,
    ) {
        self.samples.push(Sample {
            operation,
            response_time,
            status_code,
            timestamp: Utc::now(),
            cache_hit,
        });
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    // ─── Report-time views ──────────────────────────────────────

    /// Samples grouped by operation label, label-ordered.
    pub fn by_operation(&self) -> BTreeMap<Operation, Vec<&Sample>> {
        let mut groups: BTreeMap<Operation, Vec<&Sample>> = BTreeMap::new();
        for s in &self.samples {
            groups.entry(s.operation).or_default().push(s);
        }
        groups
    }

    /// Response times (seconds) for one operation label.
    pub fn times_for(&self, operation: Operation) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|s| s.operation == operation)
            .map(|s| s.response_time.as_secs_f64())
            .collect()
    }

    /// (misses, hits): counts of samples by `cache_hit` value.
    pub fn cache_hit_counts(&self) -> (u64, u64) {
        let hits = self.samples.iter().filter(|s| s.cache_hit).count() as u64;
        (self.samples.len() as u64 - hits, hits)
    }

    /// Counts of samples by status code. Requests that never got a
    /// response are grouped under `None`.
    pub fn status_code_counts(&self) -> BTreeMap<Option<u16>, u64> {
        let mut counts: BTreeMap<Option<u16>, u64> = BTreeMap::new();
        for s in &self.samples {
            *counts.entry(s.status_code).or_default() += 1;
        }
        counts
    }

    /// Per-label error rate in percent: count(status >= 400) / count(total).
    /// Transport failures carry no status and count in the denominator only.
    pub fn error_rates(&self) -> BTreeMap<Operation, f64> {
        self.by_operation()
            .into_iter()
            .map(|(op, group)| {
                let errors = group
                    .iter()
                    .filter(|s| matches!(s.status_code, Some(c) if c >= 400))
                    .count();
                (op, errors as f64 / group.len() as f64 * 100.0)
            })
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
