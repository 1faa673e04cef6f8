//! Mock market: moves every tracked price by one random factor per refresh.
//!
//! Each call to [`MarketSimulator::apply`] draws a single multiplier
//! `r = 0.9 + u * 0.2` with `u` uniform in `[0, 1)`, so `r` lies in `[0.9, 1.1)`.
//! That one `r` rescales all five prices of every record in the batch; it is
//! never re-drawn per record or per field. Rounding to cents follows the
//! configured [`PriceRounding`].
//!
//! The simulator works on the snapshot slice it is handed and returns new
//! records. It never touches a store.

use rust_decimal::{Decimal, RoundingStrategy};

use quote_common::{PriceRounding, QuoteError, QuoteRecord, RefreshConfig, Result};

use crate::model::random::{RngSource, UnitSource};

/// Lower bound of the per-refresh multiplier (0.9).
pub const MULTIPLIER_FLOOR: Decimal = Decimal::from_parts(9, 0, 0, false, 1);
/// Width of the multiplier range above the floor (0.2).
pub const MULTIPLIER_SPAN: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
/// Decimal places kept from a unit draw; truncation keeps `r` below 1.1.
pub const UNIT_DECIMALS: u32 = 12;

/// Map a uniform draw in `[0, 1)` to a multiplier in `[0.9, 1.1)`.
///
/// The draw is truncated to [`UNIT_DECIMALS`] places before scaling, so the
/// result is an exact decimal.
pub fn multiplier_from_unit(unit: f64) -> Result<Decimal> {
    if !(0.0..1.0).contains(&unit) {
        return Err(QuoteError::SimulationFailure(format!(
            "unit draw {} outside [0, 1)",
            unit
        )));
    }
    let unit = Decimal::from_f64_retain(unit)
        .ok_or_else(|| {
            QuoteError::SimulationFailure(format!("unit draw {} is not representable", unit))
        })?
        .round_dp_with_strategy(UNIT_DECIMALS, RoundingStrategy::ToZero);
    Ok(MULTIPLIER_FLOOR + unit * MULTIPLIER_SPAN)
}

/// Rescale every record by `multiplier`. Pure: same input, same output.
pub fn apply_multiplier(
    records: &[QuoteRecord],
    multiplier: Decimal,
    rounding: PriceRounding,
) -> Result<Vec<QuoteRecord>> {
    records
        .iter()
        .map(|record| record.rescaled(multiplier, rounding))
        .collect()
}

/// Random price mover with an injected source.
pub struct MarketSimulator {
    source: Box<dyn UnitSource>,
    rounding: PriceRounding,
}

impl MarketSimulator {
    /// Simulator drawing from `source`, rounding half away from zero.
    pub fn new(source: Box<dyn UnitSource>) -> Self {
        Self {
            source,
            rounding: PriceRounding::default(),
        }
    }

    /// Simulator seeded and rounded as `config` says.
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(Box::new(RngSource::from_seed_option(config.seed))).with_rounding(config.rounding)
    }

    /// Replace the rounding mode.
    pub fn with_rounding(mut self, rounding: PriceRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Rounding mode applied to rescaled prices.
    pub fn rounding(&self) -> PriceRounding {
        self.rounding
    }

    /// Draw the multiplier for one refresh.
    pub fn draw_multiplier(&mut self) -> Result<Decimal> {
        let unit = self.source.next_unit()?;
        multiplier_from_unit(unit)
    }

    /// Rescale a batch with an already drawn multiplier.
    pub fn apply_multiplier(
        &self,
        records: &[QuoteRecord],
        multiplier: Decimal,
    ) -> Result<Vec<QuoteRecord>> {
        apply_multiplier(records, multiplier, self.rounding)
    }

    /// Draw one multiplier and rescale the whole batch with it.
    ///
    /// An empty batch yields an empty result without consuming a draw.
    pub fn apply(&mut self, records: &[QuoteRecord]) -> Result<Vec<QuoteRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let multiplier = self.draw_multiplier()?;
        self.apply_multiplier(records, multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::random::FixedSource;
    use quote_common::tickers::Ticker;
    use quote_common::{Prices, QuoteId};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        draws: Vec<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl UnitSource for ScriptedSource {
        fn next_unit(&mut self) -> Result<f64> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.draws[n % self.draws.len()])
        }
    }

    struct BrokenSource;

    impl UnitSource for BrokenSource {
        fn next_unit(&mut self) -> Result<f64> {
            Err(QuoteError::SimulationFailure("entropy exhausted".to_string()))
        }
    }

    fn abev3() -> QuoteRecord {
        QuoteRecord::with_id(
            QuoteId::from("1"),
            "ABEV3",
            Prices::new(dec!(14.32), dec!(1), dec!(2), dec!(3), dec!(4)),
        )
        .unwrap()
    }

    fn catalog() -> Vec<QuoteRecord> {
        Ticker::all()
            .iter()
            .map(|t| t.seed_quote().unwrap())
            .collect()
    }

    #[test]
    fn multiplier_range_edges() {
        assert_eq!(multiplier_from_unit(0.0).unwrap(), dec!(0.9));
        assert_eq!(multiplier_from_unit(0.5).unwrap(), dec!(1.0));
        let top = multiplier_from_unit(1.0 - f64::EPSILON).unwrap();
        assert!(top < dec!(1.1));
        assert!(top > dec!(1.0999));
    }

    #[test]
    fn out_of_range_draw_is_a_simulation_failure() {
        for bad in [1.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                multiplier_from_unit(bad),
                Err(QuoteError::SimulationFailure(_))
            ));
        }
    }

    #[test]
    fn multiplier_of_one_reproduces_input() {
        let input = vec![abev3()];
        let output =
            apply_multiplier(&input, dec!(1.0), PriceRounding::HalfAwayFromZero).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn abev3_at_ninety_five_percent() {
        let output =
            apply_multiplier(&[abev3()], dec!(0.95), PriceRounding::HalfAwayFromZero).unwrap();
        assert_eq!(output[0].last_price(), dec!(13.60));
        assert_eq!(output[0].id().as_str(), "1");
    }

    #[test]
    fn one_draw_moves_every_field_of_every_record() {
        let input = catalog();
        for unit in [0.0, 0.25, 0.5, 0.8, 1.0 - f64::EPSILON] {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = ScriptedSource {
                draws: vec![unit, 0.1],
                calls: Arc::clone(&calls),
            };
            let mut simulator = MarketSimulator::new(Box::new(source));

            let output = simulator.apply(&input).unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 1, "draws for u={}", unit);

            let r = multiplier_from_unit(unit).unwrap();
            let round = |d: Decimal| {
                (d * r).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            };
            assert_eq!(output.len(), input.len());
            for (before, after) in input.iter().zip(output.iter()) {
                assert_eq!(after.id(), before.id());
                assert_eq!(after.last_price(), round(before.last_price()), "u={}", unit);
                assert_eq!(after.open_price(), round(before.open_price()), "u={}", unit);
                assert_eq!(after.average_price(), round(before.average_price()), "u={}", unit);
                assert_eq!(after.min_price(), round(before.min_price()), "u={}", unit);
                assert_eq!(after.max_price(), round(before.max_price()), "u={}", unit);
            }
        }
    }

    #[test]
    fn empty_batch_consumes_no_draw() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource {
            draws: vec![0.5],
            calls: Arc::clone(&calls),
        };
        let mut simulator = MarketSimulator::new(Box::new(source));
        assert!(simulator.apply(&[]).unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn broken_source_surfaces_as_simulation_failure() {
        let mut simulator = MarketSimulator::new(Box::new(BrokenSource));
        assert!(matches!(
            simulator.apply(&[abev3()]),
            Err(QuoteError::SimulationFailure(_))
        ));
    }

    #[test]
    fn fixed_source_lower_bound_keeps_prices_in_range() {
        let mut simulator = MarketSimulator::new(Box::new(FixedSource(0.0)));
        let output = simulator.apply(&[abev3()]).unwrap();
        assert_eq!(output[0].last_price(), dec!(12.89));
        assert_eq!(output[0].max_price(), dec!(3.60));
    }

    #[test]
    fn seeded_config_is_reproducible() {
        let config = RefreshConfig::default().with_seed(7);
        let mut a = MarketSimulator::from_config(&config);
        let mut b = MarketSimulator::from_config(&config);
        let input = catalog();
        for _ in 0..5 {
            assert_eq!(a.apply(&input).unwrap(), b.apply(&input).unwrap());
        }
    }
}
