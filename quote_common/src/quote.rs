//! Quote data model.
//!
//! A `QuoteRecord` is one instrument's price snapshot: an opaque id, the ticker
//! symbol, and five decimal prices (last, open, average, min, max). Records are
//! immutable at rest. The only way to move the prices of a tracked instrument is
//! [`QuoteRecord::rescaled`], which multiplies all five by the same factor, so a
//! single price can never drift away from the others.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{PRICE_DECIMALS, PriceRounding};
use crate::error::QuoteError;
use crate::result::Result;

/// Opaque unique identifier of a tracked quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(String);

impl QuoteId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        QuoteId(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuoteId {
    fn from(value: &str) -> Self {
        QuoteId(value.to_string())
    }
}

impl From<String> for QuoteId {
    fn from(value: String) -> Self {
        QuoteId(value)
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five prices of a quote, used to build a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Prices {
    /// Last traded price.
    pub last: Decimal,
    /// Opening price of the session.
    pub open: Decimal,
    /// Average traded price of the session.
    pub average: Decimal,
    /// Lowest price of the session.
    pub min: Decimal,
    /// Highest price of the session.
    pub max: Decimal,
}

impl Prices {
    /// Bundle the five prices in `last, open, average, min, max` order.
    pub fn new(last: Decimal, open: Decimal, average: Decimal, min: Decimal, max: Decimal) -> Self {
        Self {
            last,
            open,
            average,
            min,
            max,
        }
    }

    fn fields(&self) -> [(&'static str, Decimal); 5] {
        [
            ("lastPrice", self.last),
            ("openPrice", self.open),
            ("averagePrice", self.average),
            ("minPrice", self.min),
            ("maxPrice", self.max),
        ]
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in self.fields() {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(QuoteError::InvalidPrice {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn scaled(&self, multiplier: Decimal, rounding: PriceRounding) -> Result<Prices> {
        let scale = |field: &'static str, value: Decimal| -> Result<Decimal> {
            value
                .checked_mul(multiplier)
                .map(|p| p.round_dp_with_strategy(PRICE_DECIMALS, rounding.strategy()))
                .ok_or_else(|| {
                    QuoteError::SimulationFailure(format!(
                        "{} overflow: {} * {}",
                        field, value, multiplier
                    ))
                })
        };
        Ok(Prices {
            last: scale("lastPrice", self.last)?,
            open: scale("openPrice", self.open)?,
            average: scale("averagePrice", self.average)?,
            min: scale("minPrice", self.min)?,
            max: scale("maxPrice", self.max)?,
        })
    }
}

/// Price snapshot of a single instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    id: QuoteId,
    symbol: String,
    last_price: Decimal,
    open_price: Decimal,
    average_price: Decimal,
    min_price: Decimal,
    max_price: Decimal,
}

impl QuoteRecord {
    /// Create a record with a freshly generated id.
    pub fn new(symbol: &str, prices: Prices) -> Result<Self> {
        Self::with_id(QuoteId::generate(), symbol, prices)
    }

    /// Create a record under an id chosen by the caller.
    ///
    /// Fails with `InvalidSymbol` for a blank symbol and `InvalidPrice` when
    /// any of the five prices is negative.
    pub fn with_id(id: QuoteId, symbol: &str, prices: Prices) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(QuoteError::InvalidSymbol(symbol.to_string()));
        }
        prices.validate()?;
        Ok(Self::from_parts(id, symbol.to_string(), prices))
    }

    fn from_parts(id: QuoteId, symbol: String, prices: Prices) -> Self {
        QuoteRecord {
            id,
            symbol,
            last_price: prices.last,
            open_price: prices.open,
            average_price: prices.average,
            min_price: prices.min,
            max_price: prices.max,
        }
    }

    /// Identifier assigned at creation.
    pub fn id(&self) -> &QuoteId {
        &self.id
    }

    /// Instrument code, e.g. `ABEV3`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Last traded price.
    pub fn last_price(&self) -> Decimal {
        self.last_price
    }

    /// Opening price.
    pub fn open_price(&self) -> Decimal {
        self.open_price
    }

    /// Average price.
    pub fn average_price(&self) -> Decimal {
        self.average_price
    }

    /// Minimum price.
    pub fn min_price(&self) -> Decimal {
        self.min_price
    }

    /// Maximum price.
    pub fn max_price(&self) -> Decimal {
        self.max_price
    }

    /// All five prices at once.
    pub fn prices(&self) -> Prices {
        Prices::new(
            self.last_price,
            self.open_price,
            self.average_price,
            self.min_price,
            self.max_price,
        )
    }

    /// Same instrument with every price multiplied by `multiplier` and rounded
    /// to two decimal places.
    ///
    /// Fails with `SimulationFailure` for a negative multiplier or when a
    /// product does not fit a `Decimal`.
    pub fn rescaled(&self, multiplier: Decimal, rounding: PriceRounding) -> Result<QuoteRecord> {
        if multiplier.is_sign_negative() && !multiplier.is_zero() {
            return Err(QuoteError::SimulationFailure(format!(
                "negative multiplier {}",
                multiplier
            )));
        }
        let prices = self.prices().scaled(multiplier, rounding)?;
        Ok(Self::from_parts(self.id.clone(), self.symbol.clone(), prices))
    }
}
