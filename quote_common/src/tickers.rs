//! Catalog of known instruments and ticker file parsing.
//!
//! Hosts resolve a user-typed code against this catalog before tracking it; the
//! engine itself accepts any symbol.

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::QuoteError;
use crate::quote::{Prices, QuoteRecord};
use crate::result::Result;

/// Trait providing file parsing for tickers.
pub trait TickerParser {
    /// Parses tickers from a buffered reader.
    ///
    /// Each non-empty line is parsed as a single `Ticker` value using `FromStr`.
    /// Lines starting with `#` are skipped. Returns an error if any line cannot be parsed.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Ticker>>;
}

impl TickerParser for Ticker {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>> {
        let mut tickers = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(QuoteError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            match trimmed_line.parse::<Self>() {
                Ok(ticker) => {
                    if !tickers.contains(&ticker) {
                        tickers.push(ticker);
                    }
                }
                Err(e) => {
                    return Err(QuoteError::ParseTickersFile(format!(
                        "{}: {}",
                        trimmed_line, e
                    )));
                }
            }
        }
        Ok(tickers)
    }
}

/// Instruments the catalog can resolve.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum Ticker {
    ABEV3,
    AZUL4,
    BTOW3,
    B3SA3,
    BBSE3,
}

impl Ticker {
    /// Resolve a user-typed code, ignoring case and surrounding blanks.
    pub fn lookup(code: &str) -> Option<Ticker> {
        code.trim().parse().ok()
    }

    /// Every ticker of the catalog, in declaration order.
    pub fn all() -> Vec<Ticker> {
        Ticker::iter().collect()
    }

    /// Reference prices the catalog starts an instrument with.
    pub fn seed_prices(&self) -> Prices {
        let (last, base) = match self {
            Ticker::ABEV3 => (Decimal::new(1432, 2), 1),
            Ticker::AZUL4 => (Decimal::new(1908, 2), 10),
            Ticker::BTOW3 => (Decimal::new(8603, 2), 100),
            Ticker::B3SA3 => (Decimal::new(4958, 2), 1_000),
            Ticker::BBSE3 => (Decimal::new(2805, 2), 10_000),
        };
        let base = Decimal::from(base);
        Prices::new(
            last,
            base,
            base * Decimal::from(2),
            base * Decimal::from(3),
            base * Decimal::from(4),
        )
    }

    /// New record for this ticker with a fresh id and the seed prices.
    pub fn seed_quote(&self) -> Result<QuoteRecord> {
        QuoteRecord::new(&self.to_string(), self.seed_prices())
    }
}
