use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Timeout for the pre-run connectivity probes. Short on purpose:
/// an unreachable target should fail the run quickly.
pub const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(2);

/// Black-box benchmark harness for a caching HTTP proxy and its backend.
///
/// Issues sequential HTTP requests against both targets, records timing
/// and status telemetry, and writes a console summary plus a chart image.
/// Cache hits are classified by request position (the first large-object
/// fetch of a run counts as the miss); this is a heuristic, not a
/// protocol-level cache verification.
#[derive(Parser, Debug, Clone)]
#[command(name = "proxy-cache-bench", version)]
pub struct Config {
    /// Backend application server base URL
    #[arg(
        long,
        default_value = "http://localhost:3000",
        env = "BENCH_SERVER_URL"
    )]
    pub server_url: String,

    /// Caching proxy base URL
    #[arg(
        long,
        default_value = "http://localhost:8080",
        env = "BENCH_PROXY_URL"
    )]
    pub proxy_url: String,

    /// Host header for proxied requests; defaults to the backend URL
    /// authority
    #[arg(long, env = "BENCH_BACKEND_HOST")]
    pub backend_host: Option<String>,

    /// Number of large-object fetches through the proxy
    #[arg(long, default_value = "3")]
    pub large_requests: usize,

    /// Number of synthetic users to create
    #[arg(long, default_value = "5")]
    pub num_users: usize,

    /// Expected large-object size in MB (shown in progress output)
    #[arg(long, default_value = "10")]
    pub object_size_mb: u64,

    /// Pause between paced requests, in milliseconds
    #[arg(long, default_value = "500")]
    pub request_delay_ms: u64,

    /// Per-request timeout for scenario traffic, in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,

    /// Directory the chart image is written into
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Value for the `Host` header on proxied requests: the explicit
    /// override, or the authority part of the backend URL.
    pub fn host_header(&self) -> String {
        match &self.backend_host {
            Some(host) => host.clone(),
            None => authority(&self.server_url).to_owned(),
        }
    }
}

/// Strip scheme and path from a base URL, leaving `host[:port]`.
fn authority(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_knobs() {
        let cfg = Config::parse_from(["proxy-cache-bench"]);
        assert_eq!(cfg.server_url, "http://localhost:3000");
        assert_eq!(cfg.proxy_url, "http://localhost:8080");
        assert_eq!(cfg.large_requests, 3);
        assert_eq!(cfg.num_users, 5);
        assert_eq!(cfg.object_size_mb, 10);
        assert_eq!(cfg.request_delay(), Duration::from_millis(500));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn host_header_defaults_to_server_authority() {
        let cfg = Config::parse_from([
            "proxy-cache-bench",
            "--server-url",
            "http://10.0.0.7:3000",
        ]);
        assert_eq!(cfg.host_header(), "10.0.0.7:3000");
    }

    #[test]
    fn host_header_override_wins() {
        let cfg = Config::parse_from([
            "proxy-cache-bench",
            "--backend-host",
            "backend.internal:3000",
        ]);
        assert_eq!(cfg.host_header(), "backend.internal:3000");
    }

    #[test]
    fn authority_handles_paths_and_bare_hosts() {
        assert_eq!(authority("http://localhost:3000/api"), "localhost:3000");
        assert_eq!(authority("https://example.com"), "example.com");
        assert_eq!(authority("example.com:8080"), "example.com:8080");
    }
}
