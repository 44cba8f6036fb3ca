use std::time::Duration;

use crate::config::Config;
use crate::metrics::{Operation, SampleStore};
use crate::probe::ProbeClient;

// ─── Large-object cache scenario ─────────────────────────────────

/// Per-request detail handed back to the caller alongside the samples.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub request_number: usize,
    pub elapsed: Duration,
    pub cache_hit: bool,
    pub status_code: Option<u16>,
}

/// The first request of a run is counted as the cache miss; every
/// later one as a hit. Positional heuristic: the proxy exposes no
/// cache-status signal to verify against.
pub fn classify(index: usize) -> (Operation, bool) {
    if index == 0 {
        (Operation::LargeRequestNoCache, false)
    } else {
        (Operation::LargeRequestCached, true)
    }
}

/// Fetch the same large object through the proxy `cfg.large_requests`
/// times, pacing requests so connection reuse doesn't mask cache
/// behavior. Every attempt records exactly one sample; transport
/// failures record with no status code.
pub async fn run(client: &ProbeClient, cfg: &Config, store: &mut SampleStore) -> Vec<FetchResult> {
    println!();
    println!(
        "Testing large object ({} MB) through proxy...",
        cfg.object_size_mb
    );

    let url = format!("{}/large", cfg.proxy_url);
    let host = cfg.host_header();
    let mut results = Vec::with_capacity(cfg.large_requests);

    for i in 0..cfg.large_requests {
        println!("Request {}/{}...", i + 1, cfg.large_requests);

        let outcome = client.get(&url, Some(&host), cfg.request_timeout()).await;
        let (operation, cache_hit) = classify(i);
        store.record(operation, outcome.elapsed, outcome.status(), cache_hit);

        match &outcome.result {
            Ok(resp) if resp.status == 200 => {
                println!(
                    "   ✓ {:.4} s — {:.2} MB received",
                    outcome.elapsed.as_secs_f64(),
                    resp.body.len() as f64 / (1024.0 * 1024.0),
                );
            }
            Ok(resp) => {
                println!("   ✗ request {} failed with status {}", i + 1, resp.status);
            }
            Err(err) => {
                println!("   ✗ request {} failed: {err}", i + 1);
            }
        }

        results.push(FetchResult {
            request_number: i + 1,
            elapsed: outcome.elapsed,
            cache_hit,
            status_code: outcome.status(),
        });

        if i + 1 < cfg.large_requests {
            tokio::time::sleep(cfg.request_delay()).await;
        }
    }

    results
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_the_miss() {
        assert_eq!(classify(0), (Operation::LargeRequestNoCache, false));
    }

    #[test]
    fn every_later_request_is_a_hit() {
        for i in 1..10 {
            assert_eq!(classify(i), (Operation::LargeRequestCached, true));
        }
    }

    #[test]
    fn n_requests_split_into_one_miss_and_n_minus_one_hits() {
        for n in [1usize, 2, 3, 8] {
            let misses = (0..n).filter(|&i| !classify(i).1).count();
            let hits = (0..n).filter(|&i| classify(i).1).count();
            assert_eq!(misses, 1);
            assert_eq!(hits, n - 1);
        }
    }
}
