//! GEX CLI
//!
//! Fetches (or loads) an index option chain and prints the dealer gamma
//! exposure summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gex_engine::prelude::*;

/// Dealer gamma exposure, gamma flip and GEX zone for an index option chain
#[derive(Parser)]
#[command(name = "gex", version, about)]
struct Cli {
    /// Underlying ticker on the CBOE delayed-quotes feed
    #[arg(long, default_value = "SPX")]
    ticker: String,

    /// Half-width of the strike window around spot (overrides the config)
    #[arg(long)]
    width: Option<f64>,

    /// JSON config file; absent keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyze a saved snapshot (or raw CBOE response) instead of fetching
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Snapshot cache directory
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,

    /// Bypass the snapshot cache entirely
    #[arg(long)]
    no_cache: bool,

    /// Drop the cached snapshot and fetch a fresh one into the cache
    #[arg(long, conflicts_with = "no_cache")]
    refresh: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> GexResult<()> {
    let mut config = match &cli.config {
        Some(path) => GexConfig::from_json_file(path)?,
        None => GexConfig::default(),
    };
    if let Some(width) = cli.width {
        config = config.with_width(width);
    }

    let snapshot = load_snapshot(cli)?;
    let report = GexAnalyzer::with_config(config).analyze(&snapshot)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| GexError::Serialization(e.to_string()))?;
        println!("{json}");
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn load_snapshot(cli: &Cli) -> GexResult<ChainSnapshot> {
    if let Some(path) = &cli.snapshot {
        let body = std::fs::read_to_string(path)?;
        // Our own cache format first, then the vendor's response body
        return match serde_json::from_str::<ChainSnapshot>(&body) {
            Ok(snapshot) => Ok(snapshot),
            Err(_) => parse_chain_response(&cli.ticker, &body),
        };
    }

    let fetcher = CachedFetcher::new(CacheConfig {
        cache_dir: cli.cache_dir.clone(),
        enabled: !cli.no_cache,
        ..Default::default()
    })?;
    if cli.refresh {
        fetcher.refresh_chain(&cli.ticker)
    } else {
        fetcher.get_chain(&cli.ticker)
    }
}

fn print_summary(report: &GexReport) {
    println!("{} Gamma Exposure", report.underlying);
    println!("==========================\n");
    println!("  As of: {}", report.as_of);
    println!("  Spot: {:.2}", report.spot);
    println!(
        "  Total Gamma: ${:.2} Bn per 1% move",
        report.total_gamma_bn()
    );

    match (report.zero_gamma, report.above_flip()) {
        (Some(flip), Some(above)) => {
            let regime = if above { "positive gamma" } else { "negative gamma" };
            println!("  Gamma Flip: {:.2} (spot in {})", flip, regime);
        }
        _ => println!("  Gamma Flip: none in sampled range"),
    }

    let profile = &report.profile;
    if let Some(exp) = profile.next_expiry {
        println!("  Next Expiry: {}", exp);
    }
    if let Some(exp) = profile.next_monthly_expiry {
        println!("  Next Monthly: {}", exp);
    }

    let Some(window) = &report.window else {
        println!("\nNo strikes within ±{:.0} of spot", report.config.window.width);
        return;
    };

    println!("\nWindow ±{:.0}:", window.width);
    println!(
        "  Max GEX: {:.0} ({:.0})",
        window.max_gex.strike, window.max_gex.net_gex
    );
    println!(
        "  Min GEX: {:.0} ({:.0})",
        window.min_gex.strike, window.min_gex.net_gex
    );
    println!(
        "  Zone: {:.0} - {:.0} (width {:.0}), spot {}",
        window.zone.lower_strike,
        window.zone.upper_strike,
        window.zone_width(),
        window.status.label()
    );

    let fmt_strikes = |strikes: Vec<f64>| {
        strikes
            .iter()
            .map(|s| format!("{s:.0}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let fmt_threshold = |t: Option<f64>| t.map_or_else(|| "n/a".to_string(), |t| format!("{t:.0}"));
    println!(
        "  High OI (>= {}): {}",
        fmt_threshold(window.oi_threshold),
        fmt_strikes(window.high_oi.iter().map(|r| r.strike).collect())
    );
    println!(
        "  High Conviction (>= {}): {}",
        fmt_threshold(window.high_conviction_threshold),
        fmt_strikes(window.high_conviction_strikes())
    );
}
