//!
//! Common types and utilities shared by the quote engine and its hosts.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `quote` — the `QuoteRecord` price snapshot and its id.
//! - `tickers` — catalog of known instruments and ticker file parsing.
//! - `config` — refresh interval and rounding settings.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod quote;
pub mod result;
pub mod tickers;

pub use config::{PriceRounding, RefreshConfig};
pub use error::QuoteError;
pub use quote::{Prices, QuoteId, QuoteRecord};
pub use result::Result;
