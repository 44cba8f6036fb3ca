use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use proxy_cache_bench::config::Config;
use proxy_cache_bench::connectivity;
use proxy_cache_bench::metrics::SampleStore;
use proxy_cache_bench::probe::ProbeClient;
use proxy_cache_bench::report::{charts, summary};
use proxy_cache_bench::scenarios::{large_object, user_lifecycle};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = Config::parse();

    let default_level = if cfg.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let run_id = Uuid::new_v4();

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   🔬  PROXY CACHE BENCHMARK HARNESS             ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();
    println!("Run     {run_id}");
    println!("Backend → {}", cfg.server_url);
    println!("Proxy   → {}", cfg.proxy_url);

    let client = match ProbeClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("failed to build HTTP client: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = SampleStore::new();

    // ── 1. Connectivity ─────────────────────────────────────────
    if !connectivity::check_servers(&client, &cfg, &mut store).await {
        eprintln!();
        eprintln!("Connectivity check failed — aborting before any scenario runs.");
        return ExitCode::FAILURE;
    }

    // ── 2. Scenarios ────────────────────────────────────────────
    large_object::run(&client, &cfg, &mut store).await;
    user_lifecycle::run(&client, &cfg, &mut store).await;

    // ── 3. Reporting ────────────────────────────────────────────
    print!("{}", summary::render_summary(&store, run_id));
    match charts::render_charts(&store, &cfg.output_dir) {
        Ok(Some(path)) => {
            println!("Performance charts saved to {}", path.display());
        }
        Ok(None) => {
            println!("No samples collected — no charts written.");
        }
        Err(err) => {
            // The exit code reflects connectivity only; a chart I/O
            // problem is reported but does not fail the run.
            tracing::error!(%err, "failed to write charts");
        }
    }

    ExitCode::SUCCESS
}
