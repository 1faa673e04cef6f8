//! Quote Watch — a terminal host for the quote refresh engine.
//!
//! It seeds an in-memory store with catalog instruments, starts a
//! `RefreshScheduler`, and prints every refreshed snapshot until Ctrl+C or until
//! the requested number of refreshes has been shown.
//!
//! Usage example (CLI):
//! ```bash
//! quote_watch --symbol abev3 --symbol azul4 --interval-ms 500 --ticks 10
//! quote_watch --path ./tickers.txt --seed 42 --json
//! ```
//!
//! The ticker file should contain one symbol per line. See
//! `quote_common::tickers` for details.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use clap::Parser;
use crossbeam_channel::{Receiver, select, unbounded};
use log::{error, info, warn};
use quote_common::tickers::{Ticker, TickerParser};
use quote_common::{QuoteError, Result};
use quote_engine::{RefreshEvent, RefreshScheduler, SharedQuoteStore};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    let config = args.refresh_config();

    let tickers = resolve_tickers(&args)?;
    info!("Tickers: {:?}", tickers);
    let store = seed_store(&tickers)?;

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down watcher...");
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    let (event_tx, event_rx) = unbounded::<RefreshEvent>();
    let scheduler = RefreshScheduler::from_config(store, &config, Arc::new(event_tx))?;
    scheduler.start(config.interval)?;
    info!("Watching {} quotes. Press Ctrl+C to exit.", tickers.len());

    let result = watch_loop(&event_rx, &shutdown_rx, &args);
    scheduler.cancel()?;
    result
}

/// Print refreshes until shutdown is requested or `--ticks` is reached.
fn watch_loop(
    events: &Receiver<RefreshEvent>,
    shutdown: &Receiver<()>,
    args: &Args,
) -> Result<()> {
    let mut shown: u64 = 0;
    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(events) -> msg => match msg {
                Ok(event) => {
                    render(&event, args.json)?;
                    shown += 1;
                    if args.ticks.is_some_and(|limit| shown >= limit) {
                        info!("Shown {} refreshes, stopping", shown);
                        break;
                    }
                }
                Err(e) => {
                    error!("Refresh channel closed: {}", e);
                    break;
                }
            }
        }
    }
    Ok(())
}

fn render(event: &RefreshEvent, json: bool) -> Result<()> {
    if json {
        let line = event.to_json_line()?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        return Ok(());
    }
    info!(
        "REFRESH #{} x{} at {}",
        event.sequence,
        event.multiplier,
        event.refreshed_at.format("%H:%M:%S%.3f")
    );
    for quote in &event.quotes {
        info!(
            "QUOTE: {} Last={:.2} Open={:.2} Avg={:.2} Min={:.2} Max={:.2}",
            quote.symbol(),
            quote.last_price(),
            quote.open_price(),
            quote.average_price(),
            quote.min_price(),
            quote.max_price()
        );
    }
    Ok(())
}

/// Tickers from `--path` and `--symbol`, or the whole catalog when both are absent.
fn resolve_tickers(args: &Args) -> Result<Vec<Ticker>> {
    let mut tickers = Vec::new();
    if let Some(raw) = &args.path {
        let file_path = normalize_path(raw);
        let file = File::open(&file_path).map_err(|e| {
            QuoteError::ParseTickersFile(format!("{}: {}", file_path.display(), e))
        })?;
        tickers = Ticker::parse_from_file(BufReader::new(file))?;
    }
    for ticker in &args.symbols {
        if !tickers.contains(ticker) {
            tickers.push(*ticker);
        }
    }
    if tickers.is_empty() {
        warn!("No tickers given, watching the whole catalog");
        tickers = Ticker::all();
    }
    Ok(tickers)
}

fn seed_store(tickers: &[Ticker]) -> Result<SharedQuoteStore> {
    let store = SharedQuoteStore::new();
    for ticker in tickers {
        store.add(ticker.seed_quote()?)?;
    }
    Ok(store)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_strips_quotes() {
        assert_eq!(normalize_path(" \"C:\\tickers.txt\" "), PathBuf::from("C:\\tickers.txt"));
        assert_eq!(normalize_path("./tickers.txt"), PathBuf::from("./tickers.txt"));
    }

    #[test]
    fn catalog_is_the_fallback() {
        let args = Args::parse_from(["quote_watch"]);
        assert_eq!(resolve_tickers(&args).unwrap(), Ticker::all());
    }

    #[test]
    fn symbols_are_deduplicated() {
        let args = Args::parse_from(["quote_watch", "--symbol", "azul4", "--symbol", "azul4"]);
        assert_eq!(resolve_tickers(&args).unwrap(), vec![Ticker::AZUL4]);
    }

    #[test]
    fn seeded_store_tracks_each_ticker() {
        let store = seed_store(&[Ticker::ABEV3, Ticker::B3SA3]).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert!(store.find_by_symbol("b3sa3").unwrap().is_some());
    }
}
