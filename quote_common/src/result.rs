//! Result type alias shared across the workspace.
//!
//! Functions default their error type to `QuoteError` and simply return `Result<T>`.
use crate::error::QuoteError;

/// Workspace-wide `Result` alias with `QuoteError` as the default error.
pub type Result<T, E = QuoteError> = std::result::Result<T, E>;
