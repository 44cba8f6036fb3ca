use crate::config::{Config, CONNECTIVITY_TIMEOUT};
use crate::metrics::{Operation, SampleStore};
use crate::probe::{ProbeClient, ProbeError};

// ─── Pre-run connectivity check ──────────────────────────────────

/// Probe both targets once before any scenario runs. Every attempt is
/// recorded as a sample, success or not. Returns true only when both
/// endpoints answered 200; anything else means the run must abort
/// before producing misleading timing data.
pub async fn check_servers(client: &ProbeClient, cfg: &Config, store: &mut SampleStore) -> bool {
    let backend_up = check_one(
        client,
        store,
        Operation::ServerStatusCheck,
        &format!("{}/test", cfg.server_url),
        None,
        "backend server",
    )
    .await;
    if !backend_up {
        return false;
    }

    check_one(
        client,
        store,
        Operation::ProxyStatusCheck,
        &format!("{}/test", cfg.proxy_url),
        Some(&cfg.host_header()),
        "proxy server",
    )
    .await
}

async fn check_one(
    client: &ProbeClient,
    store: &mut SampleStore,
    operation: Operation,
    url: &str,
    host: Option<&str>,
    what: &str,
) -> bool {
    println!();
    println!("Testing {what} connectivity...");
    tracing::debug!(url, ?host, "connectivity probe");

    let outcome = client.get(url, host, CONNECTIVITY_TIMEOUT).await;
    store.record(operation, outcome.elapsed, outcome.status(), false);

    match &outcome.result {
        Ok(resp) if resp.status == 200 => {
            println!(
                "   ✓ {what} is running ({:.0} ms)",
                outcome.elapsed.as_secs_f64() * 1000.0
            );
            true
        }
        Ok(resp) => {
            println!(
                "   ✗ {what} returned unexpected status: {}",
                resp.status
            );
            false
        }
        Err(ProbeError::Timeout) => {
            println!("   ✗ {what} connection timed out");
            false
        }
        Err(ProbeError::Connect(reason)) => {
            println!("   ✗ cannot connect to {what}");
            println!("     → is anything listening at {url}?");
            tracing::debug!(%reason, "connect failure");
            false
        }
        Err(err) => {
            println!("   ✗ {what} error: {err}");
            false
        }
    }
}
