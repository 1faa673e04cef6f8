//! Command-line arguments for the quote watcher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use clap::Parser;
use quote_common::config::DEFAULT_REFRESH_INTERVAL;
use quote_common::tickers::Ticker;
use quote_common::{PriceRounding, RefreshConfig};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Ticker to track; repeat the flag for several. Defaults to the whole catalog.
    #[clap(long = "symbol", value_enum)]
    pub symbols: Vec<Ticker>,

    /// Path to a text file with one ticker per line.
    #[clap(long)]
    pub path: Option<String>,

    /// Milliseconds between two refreshes.
    #[clap(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_millis() as u64)]
    pub interval_ms: u64,

    /// Seed for the price multiplier; random when omitted.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Rounding applied to rescaled prices.
    #[clap(long, value_enum, default_value_t = PriceRounding::HalfAwayFromZero)]
    pub rounding: PriceRounding,

    /// Stop after this many refreshes; runs until Ctrl+C when omitted.
    #[clap(long)]
    pub ticks: Option<u64>,

    /// Print every refresh as one JSON line on stdout.
    #[clap(long)]
    pub json: bool,
}

impl Args {
    /// Refresh settings carried by the flags.
    pub fn refresh_config(&self) -> RefreshConfig {
        let config = RefreshConfig::default()
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_rounding(self.rounding);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}
