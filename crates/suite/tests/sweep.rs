//! Live sweep binary
//!
//! Runs the data-provider rows against a real application instance. Skips
//! with exit code 0 when no target is configured, so plain `cargo test`
//! stays hermetic; point `WEBCHECK_BASE_URL` (and friends) at a running
//! instance to make it bite.
//!
//! Run with: cargo test --package webcheck-suite --test sweep

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webcheck_harness::target::bind;
use webcheck_harness::{HarnessConfig, ScenarioRunner, Store, SweepSummary};
use webcheck_suite::providers::{self, DISCOVERY_CREATE, GRAPH_PROTOTYPE_CREATE};
use webcheck_suite::targets::{self, HostContext};

#[derive(Parser, Debug)]
#[command(name = "webcheck-sweep")]
#[command(about = "Data-driven configuration-form sweep")]
struct Args {
    /// Run only this provider
    #[arg(short, long)]
    provider: Option<String>,

    /// Run only this row index within the selected provider
    #[arg(short, long)]
    row: Option<usize>,

    /// Base URL of the application under test (overrides WEBCHECK_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to the application's SQLite database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to the WebDriver binary
    #[arg(long)]
    driver_bin: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    if args.base_url.is_none() && !HarnessConfig::target_configured() {
        println!("sweep skipped: WEBCHECK_BASE_URL is not set and no --base-url was given");
        std::process::exit(0);
    }

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let mut config = HarnessConfig::from_env();
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(bin) = args.driver_bin {
        config.driver.binary_path = bin;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    let registry = providers::registry()?;
    let host = HostContext::default();
    let discovery = targets::discovery_rule(&host);

    // Graph prototypes hang off a seeded discovery rule; look its id up in
    // the backing store instead of hardcoding it
    let store = Store::open(&config.db_path)?;
    let id_query = bind(&discovery.queries.id_by_name, "name", "testFormDiscoveryRule1");
    let rule_id: i64 = store
        .rows(&id_query)?
        .first()
        .and_then(|row| row.first())
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("seeded discovery rule 'testFormDiscoveryRule1' not found"))?;
    let graph_prototype = targets::graph_prototype(rule_id);

    let output_dir = config.output_dir.clone();
    let runner = ScenarioRunner::start(config).await?;

    let mut rows = Vec::new();
    let mut duration_ms = 0;

    for name in registry.names() {
        if let Some(only) = &args.provider {
            if name != only.as_str() {
                continue;
            }
        }
        let target = match name {
            DISCOVERY_CREATE => &discovery,
            GRAPH_PROTOTYPE_CREATE => &graph_prototype,
            other => anyhow::bail!("provider '{}' has no form target", other),
        };
        let summary = runner
            .run_provider(target, name, registry.provider(name)?, args.row)
            .await?;
        duration_ms += summary.duration_ms;
        rows.extend(summary.rows);
    }

    // No-op update and cancel scenarios against the seeded rules
    if args.provider.is_none() {
        let seeded = providers::discovery::update_names();
        for name in &seeded {
            let result = runner.run_noop_update(&discovery, name).await?;
            duration_ms += result.duration_ms;
            rows.push(result);
        }
        let result = runner.run_cancel(&discovery, seeded[0]).await?;
        duration_ms += result.duration_ms;
        rows.push(result);
    }

    let summary = SweepSummary::from_rows(rows, duration_ms);

    info!(
        "Sweep finished: {} passed, {} failed of {} row(s)",
        summary.passed, summary.failed, summary.total
    );
    summary.write(&output_dir)?;

    Ok(summary.all_passed())
}
