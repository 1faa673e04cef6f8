//! Refresh configuration shared by the engine and its hosts.

use std::time::Duration;

use clap::ValueEnum;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::QuoteError;
use crate::result::Result;

/// Interval between two refresh ticks when the host does not pick one.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Number of decimal places kept on every price after a rescale.
pub const PRICE_DECIMALS: u32 = 2;

/// How a rescaled price is rounded to [`PRICE_DECIMALS`] places.
///
/// Only values exactly half-way between two cents are affected: `0.125`
/// becomes `0.13` with `HalfAwayFromZero` and `0.12` with `HalfEven`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PriceRounding {
    /// Commercial rounding: half-way values move away from zero.
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding: half-way values go to the even neighbour.
    HalfEven,
}

impl PriceRounding {
    /// Matching `rust_decimal` strategy.
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            PriceRounding::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            PriceRounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Settings a host hands to the refresh scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between two ticks.
    pub interval: Duration,
    /// Rounding applied to rescaled prices.
    pub rounding: PriceRounding,
    /// Seed for the multiplier source; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            rounding: PriceRounding::default(),
            seed: None,
        }
    }
}

impl RefreshConfig {
    /// Replace the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the rounding mode.
    pub fn with_rounding(mut self, rounding: PriceRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Use a fixed seed for the multiplier source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_interval(self.interval)
    }
}

/// A refresh interval must be non-zero.
pub fn validate_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(QuoteError::InvalidConfig(
            "refresh interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_refreshes_every_two_seconds() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.rounding, PriceRounding::HalfAwayFromZero);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = RefreshConfig::default().with_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(QuoteError::InvalidConfig(_))));
    }

    #[test]
    fn rounding_parses_from_kebab_case() {
        assert_eq!(
            "half-even".parse::<PriceRounding>().ok(),
            Some(PriceRounding::HalfEven)
        );
        assert_eq!(PriceRounding::HalfAwayFromZero.to_string(), "half-away-from-zero");
    }
}
