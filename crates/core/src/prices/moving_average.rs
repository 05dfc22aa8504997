//! N-period moving average over the most recent ticks of a symbol.
//!
//! The average is computed in fixed point so that every implementation
//! produces the same string for the same ticks:
//!
//! 1. scale each price by 10^6 and round half away from zero to an integer,
//! 2. sum the scaled integers,
//! 3. divide by the count, rounding half away from zero,
//! 4. rescale by 10^-6 and print with exactly six fractional digits.

use std::sync::Arc;

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tickwatch_market_data::Symbol;

use super::prices_model::Price;
use super::prices_traits::PriceServiceTrait;
use crate::constants::{DECIMAL_PRECISION, FIXED_POINT_SCALE};
use crate::errors::Result;

/// Result of a moving-average computation.
///
/// `average` is `None` when fewer than `periods` ticks exist; that is an
/// expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAverage {
    pub symbol: Symbol,
    pub periods: usize,
    pub average: Option<String>,
    pub data_points_used: usize,
}

pub struct MovingAverageEngine {
    prices: Arc<dyn PriceServiceTrait>,
}

impl MovingAverageEngine {
    pub fn new(prices: Arc<dyn PriceServiceTrait>) -> Self {
        MovingAverageEngine { prices }
    }

    /// Computes the `periods`-tick moving average for `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if `periods` is zero. A zero window is a caller bug.
    pub fn compute(&self, symbol: &Symbol, periods: usize) -> Result<MovingAverage> {
        assert!(
            periods > 0,
            "moving average periods must be a positive integer, got {}",
            periods
        );

        debug!("Calculating {}-period moving average for {}", periods, symbol);

        let ticks = self.prices.recent(symbol, periods)?;
        let mut result = MovingAverage {
            symbol: symbol.clone(),
            periods,
            average: None,
            data_points_used: ticks.len(),
        };

        if ticks.len() < periods {
            debug!(
                "Insufficient data points for {}: {} < {}",
                symbol,
                ticks.len(),
                periods
            );
            return Ok(result);
        }

        let prices: Vec<Price> = ticks.iter().map(|t| t.price).collect();
        result.average = fixed_point_average(&prices).map(|avg| avg.to_string());

        debug!(
            "Calculated {}-period moving average for {}: {:?}",
            periods, symbol, result.average
        );

        Ok(result)
    }
}

/// Fixed-point mean of `prices` with six fractional digits.
///
/// Returns `None` for an empty slice.
pub fn fixed_point_average(prices: &[Price]) -> Option<Decimal> {
    if prices.is_empty() {
        return None;
    }

    let scale = Decimal::from(FIXED_POINT_SCALE);
    let sum: i128 = prices
        .iter()
        .map(|p| scaled_units(p.value(), scale))
        .sum();

    let count = prices.len() as i128;
    let mut quotient = sum / count;
    // Prices are positive, so half-away-from-zero is half-up.
    if (sum % count) * 2 >= count {
        quotient += 1;
    }

    Decimal::try_from_i128_with_scale(quotient, DECIMAL_PRECISION).ok()
}

/// `value * 10^6` rounded to an integer.
fn scaled_units(value: Decimal, scale: Decimal) -> i128 {
    // Price construction guarantees this product fits.
    (value * scale)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .unwrap_or_default()
}
