//! Intent Auction — Entry Point
//!
//! Runs one auction scenario to completion and exits.
//!
//! Wiring sequence:
//! 1. Load the scenario file (first argument, default `scenario.toml`)
//! 2. Init tracing (JSON structured logging)
//! 3. Build and validate users, orders and solvers
//! 4. Create the in-process order bus and outcome sinks
//! 5. Run the auction engine
//! 6. Report the summary; a fatal invariant violation exits non-zero

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use intent_auction::adapters::bus::AuctionBus;
use intent_auction::adapters::metrics::AuctionMetrics;
use intent_auction::adapters::report::OutcomeLog;
use intent_auction::config;
use intent_auction::usecases::AuctionEngine;

const DEFAULT_SCENARIO: &str = "scenario.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load scenario configuration ──────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENARIO.to_string());
    let config = config::load_config(&path).context("Failed to load scenario")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.run.log_level)),
        )
        .json()
        .init();

    info!(
        run = %config.run.name,
        version = env!("CARGO_PKG_VERSION"),
        scenario = %path,
        "Starting intent auction"
    );

    // ── 3. Build validated entities ─────────────────────────
    let scenario = config::build_scenario(&config).context("Invalid scenario")?;
    let solver_count = scenario.solvers.len();

    // ── 4. Bus and outcome sinks ────────────────────────────
    let bus = Arc::new(AuctionBus::new());
    let mut engine = AuctionEngine::new(bus, Duration::from_millis(config.run.settle_delay_ms));

    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(
            AuctionMetrics::new(&config.metrics.namespace)
                .context("Failed to register metrics")?,
        );
        metrics
            .active_solvers
            .set(i64::try_from(solver_count).unwrap_or(i64::MAX));
        engine = engine.with_sink(Arc::clone(&metrics) as _);
        Some(metrics)
    } else {
        None
    };

    if config.report.enabled {
        let mut log = OutcomeLog::new(&config.report.dir)
            .await
            .context("Failed to open outcome report")?;
        if let Some(metrics) = &metrics {
            log = log.with_metrics(Arc::clone(metrics));
        }
        engine = engine.with_sink(Arc::new(log));
    }

    // ── 5. Run the auction ──────────────────────────────────
    let result = engine.run(scenario).await;
    if let Some(metrics) = &metrics {
        metrics.active_solvers.set(0);
    }

    // ── 6. Summary ──────────────────────────────────────────
    match result {
        Ok(summary) => {
            info!(
                run = %config.run.name,
                orders = summary.outcomes.len(),
                filled = summary.filled,
                unfilled = summary.unfilled,
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            let chain = format!("{e:#}");
            error!(error = %chain, "Run aborted");
            Err(e)
        }
    }
}
