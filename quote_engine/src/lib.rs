//! Quote refresh engine.
//!
//! This crate keeps tracked quotes in memory and moves their prices on a timer.
//! It wires together three building blocks:
//!
//! - `QuoteStore` — the authoritative, insertion-ordered list of `QuoteRecord`s,
//!   shared between host and scheduler through `SharedQuoteStore`.
//! - `MarketSimulator` — draws one random multiplier per refresh and rescales every
//!   price of every record with it.
//! - `RefreshScheduler` — a background thread that periodically runs the
//!   simulator over the store and hands each new snapshot to a `RefreshSubscriber`.
//!
//! A host seeds the store, starts the scheduler when its quote view becomes
//! visible, renders every `RefreshEvent`, and cancels the scheduler when the view
//! goes away.
#![warn(missing_docs)]

pub mod model;
pub mod scheduler;
pub mod subscriber;

pub use model::random::{FixedSource, RngSource, UnitSource};
pub use model::simulator::MarketSimulator;
pub use model::store::{QuoteStore, SharedQuoteStore};
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use subscriber::{CallbackSubscriber, RefreshEvent, RefreshSubscriber};
