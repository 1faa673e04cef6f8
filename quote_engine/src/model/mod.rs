//! Domain models of the refresh engine.
//!
//! - `store` — `QuoteStore` registry and its `SharedQuoteStore` handle.
//! - `random` — injectable uniform draw sources.
//! - `simulator` — `MarketSimulator`, the one-multiplier-per-refresh price mover.

pub mod random;
pub mod simulator;
pub mod store;
