use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use trade_audit::config::Config;
use trade_audit::models::Trade;
use trade_audit::report::Auditor;

/// Behavioral audit of a closed-trade history.
#[derive(Parser, Debug)]
#[command(name = "trade-audit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON array of normalized trades
    file: PathBuf,

    /// Only audit these symbols (comma separated)
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Monte Carlo trial count
    #[arg(long)]
    trials: Option<usize>,

    /// Master seed for clustering and Monte Carlo
    #[arg(long)]
    seed: Option<u64>,

    /// Number of behavioral clusters
    #[arg(long)]
    clusters: Option<usize>,

    /// Print the full report as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    if let Some(trials) = cli.trials {
        cfg.monte_carlo_trials = trials;
    }
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(k) = cli.clusters {
        cfg.cluster_count = k;
    }

    let raw = fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let trades: Vec<Trade> = serde_json::from_str(&raw)
        .with_context(|| format!("decoding trades from {}", cli.file.display()))?;
    info!("Loaded {} trades from {}", trades.len(), cli.file.display());

    let auditor = Auditor::new(cfg).context("invalid configuration")?;
    let report = if cli.symbols.is_empty() {
        auditor.run(trades)?
    } else {
        auditor.run_for_symbols(trades, &cli.symbols)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }

    Ok(())
}
