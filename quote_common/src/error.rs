//! Error types shared by the engine and the watcher.
//!
//! The `QuoteError` enum unifies store failures, simulation failures, scheduler
//! misuse, and the I/O and serialization errors the host runs into, allowing
//! crates to propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

use crate::quote::QuoteId;

/// Unified error type shared by all crates of the workspace.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// A record with the same id is already tracked by the store.
    #[error("Duplicate quote id: {0}")]
    DuplicateId(QuoteId),

    /// No record with the given id is tracked by the store.
    #[error("Quote not found: {0}")]
    NotFound(QuoteId),

    /// The random source or the price arithmetic failed during a refresh.
    #[error("Simulation failure: {0}")]
    SimulationFailure(String),

    /// A price field was negative.
    #[error("Invalid price for {field}: {value}")]
    InvalidPrice {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value, as text.
        value: String,
    },

    /// A quote symbol was blank.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Refresh configuration could not be used as given.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start` was called on a scheduler that is already ticking.
    #[error("Refresh scheduler is already started")]
    AlreadyStarted,

    /// `start` was called on a scheduler that has been cancelled.
    #[error("Refresh scheduler is cancelled")]
    SchedulerCancelled,

    /// The host subscriber rejected a refresh notification.
    #[error("Subscriber failed: {0}")]
    Subscriber(String),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// I/O error originating from the standard library (files, thread spawning).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error while parsing the ticker file into `Ticker` values.
    #[error("Parse tickers file error: {0}")]
    ParseTickersFile(String),
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}
