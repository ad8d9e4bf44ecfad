//! # Pricing Engine
//!
//! Computes suggested buy and sell prices for marketplace items from recent
//! price history. The engine is a pure, synchronous calculation: callers fetch
//! history, order-book depth and listing snapshots themselves and pass the
//! resolved data in, together with the current time.
//!
//! A run goes through three stages:
//! 1. filter the history to the analysis window and the price corridor,
//! 2. quote with the configured [`StrategyKind`] (profit search by default),
//! 3. apply order-book skew and pre-order / pre-sale overrides.

pub mod adjust;
pub mod calculator;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod sticker;
pub mod strategy;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

pub use calculator::{PriceCalculator, PricingRequest, SeriesEntry};
pub use config::{PricingConfig, StrategyKind, DEFAULT_FEE_RATE, DEFAULT_MINIMUM_PRICE};
pub use error::{PricingError, Result};
pub use models::*;
pub use strategy::{PricingStrategy, ProfitMeasure};

/// Current version of the pricing engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Price an item in one call.
///
/// `pre_order` is the best outstanding buy order and `pre_sale` the best
/// current listing, when the caller checked them before trading.
pub fn compute_pricing(
    sample: &PriceSample,
    config: &PricingConfig,
    now: DateTime<Utc>,
    order_book: Option<&OrderBookSnapshot>,
    pre_order: Option<f64>,
    pre_sale: Option<f64>,
) -> Result<PricingResult> {
    let calculator = PriceCalculator::new(config.clone())?;
    let request = PricingRequest {
        sample,
        now,
        order_book: order_book.copied(),
        pre_order,
        pre_sale,
    };
    calculator.compute(&request)
}

/// Corridor-bound buy/sell pairs for every retained history point
pub fn price_series(
    sample: &PriceSample,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> Result<Vec<SeriesEntry>> {
    PriceCalculator::new(config.clone())?.price_series(sample, now)
}
