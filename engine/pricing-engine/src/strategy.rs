//! Base pricing strategies
//!
//! Every strategy turns a baseline price and a sticker markup into a [`Quote`].
//! All floors are applied at exactly the points listed in [`quote_at`]; fee
//! figures depend on that rounding order.

use crate::config::{PricingConfig, StrategyKind};
use crate::models::Quote;
use tracing::{debug, warn};

/// Safety stop for the profit search.
///
/// Every accepted step raises the floored profit by at least one point, and a
/// validated config keeps that profit inside roughly
/// `[-100 - 25 * (1 + p), 100 * (1 + p)]` for `p = profit_percent / 100`.
/// With `profit_percent` capped at [`MAX_PROFIT_PERCENT`] a search settles in
/// under 13 000 steps, so this limit is never the reason a search ends.
///
/// [`MAX_PROFIT_PERCENT`]: crate::config::MAX_PROFIT_PERCENT
pub const SEARCH_STEP_LIMIT: u32 = 100_000;

/// Output of a strategy run: the first quote and the one finally accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyOutcome {
    pub initial: Quote,
    pub accepted: Quote,
    /// Buy price increments accepted by the profit search
    pub steps: u32,
}

/// A formula producing a base quote from the most recent retained price
pub trait PricingStrategy {
    fn kind(&self) -> StrategyKind;

    fn price(&self, baseline: f64, sticker_markup: f64, config: &PricingConfig) -> StrategyOutcome;
}

/// Which profit figure the search tries to raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitMeasure {
    AfterFees,
    BeforeFees,
}

impl ProfitMeasure {
    pub fn of(&self, quote: &Quote) -> f64 {
        match self {
            ProfitMeasure::AfterFees => quote.profit_after_fees,
            ProfitMeasure::BeforeFees => quote.profit_before_fees,
        }
    }
}

/// Fee and profit percentages for a cost basis and a sell price
pub fn quote_metrics(buy_price: f64, cost_basis: f64, sell_price: f64, fee_rate: f64) -> Quote {
    let fee = (sell_price * fee_rate).floor();
    let profit_before_fees = ((sell_price - cost_basis) / cost_basis * 100.0).floor();
    let profit_after_fees = ((sell_price - cost_basis - fee) / cost_basis * 100.0).floor();
    Quote { buy_price, cost_basis, sell_price, fee, profit_before_fees, profit_after_fees }
}

/// Quote for a raw buy price:
///
/// ```text
/// cost  = max(minimum_price, raw + markup)
/// sell  = floor(cost * (1 + profit% / 100) * (1 - fee_rate))
/// fee   = floor(sell * fee_rate)
/// pre   = floor((sell - cost) / cost * 100)
/// post  = floor((sell - cost - fee) / cost * 100)
/// ```
pub fn quote_at(raw_buy_price: f64, sticker_markup: f64, config: &PricingConfig) -> Quote {
    let cost_basis = (raw_buy_price + sticker_markup).max(config.minimum_price);
    let sell_price =
        (cost_basis * (1.0 + config.profit_percent / 100.0) * (1.0 - config.fee_rate)).floor();
    quote_metrics(raw_buy_price, cost_basis, sell_price, config.fee_rate)
}

/// Hill-climb the buy price until the measured profit reaches `pleasant_profit`.
///
/// Each step raises the raw buy price by `price_step`; the new quote is kept
/// only if it strictly improves the measured profit. The first step that does
/// not improve ends the search and the last accepted quote is returned.
pub fn search_profit(
    start: Quote,
    sticker_markup: f64,
    config: &PricingConfig,
    measure: ProfitMeasure,
) -> (Quote, u32) {
    let mut current = start;
    let mut steps = 0u32;

    while measure.of(&current) < config.pleasant_profit {
        if steps >= SEARCH_STEP_LIMIT {
            warn!(
                "Profit search hit the step limit ({}) at buy price {} with profit {}%",
                SEARCH_STEP_LIMIT,
                current.buy_price,
                measure.of(&current)
            );
            break;
        }

        let candidate = quote_at(current.buy_price + config.price_step, sticker_markup, config);
        if measure.of(&candidate) > measure.of(&current) {
            current = candidate;
            steps += 1;
        } else {
            debug!(
                "Profit search stopped: buy {} gives {}%, not above {}%",
                candidate.buy_price,
                measure.of(&candidate),
                measure.of(&current)
            );
            break;
        }
    }

    (current, steps)
}

/// Iterative profit-target search
#[derive(Debug, Clone, Copy)]
pub struct ProfitSearchStrategy {
    measure: ProfitMeasure,
}

impl ProfitSearchStrategy {
    /// Search on post-fee profit
    pub fn after_fees() -> Self {
        Self { measure: ProfitMeasure::AfterFees }
    }

    /// Search on pre-fee profit (periodic re-adjustment variant)
    pub fn before_fees() -> Self {
        Self { measure: ProfitMeasure::BeforeFees }
    }

    pub fn measure(&self) -> ProfitMeasure {
        self.measure
    }
}

impl PricingStrategy for ProfitSearchStrategy {
    fn kind(&self) -> StrategyKind {
        match self.measure {
            ProfitMeasure::AfterFees => StrategyKind::ProfitSearch,
            ProfitMeasure::BeforeFees => StrategyKind::PreFeeProfitSearch,
        }
    }

    fn price(&self, baseline: f64, sticker_markup: f64, config: &PricingConfig) -> StrategyOutcome {
        let initial = quote_at(baseline, sticker_markup, config);
        let (accepted, steps) = search_profit(initial, sticker_markup, config, self.measure);
        StrategyOutcome { initial, accepted, steps }
    }
}

/// Non-iterative corridor clamps with percentage floor terms
#[derive(Debug, Clone, Copy, Default)]
pub struct CorridorBoundStrategy;

impl CorridorBoundStrategy {
    /// Quote for a single reference price (sticker markup already included)
    pub fn quote_for(&self, reference: f64, config: &PricingConfig) -> Quote {
        let profit = reference * (config.profit_percent / 100.0);
        let min_profit = reference * (config.min_profit / 100.0);
        let low_profit = match config.low_profit {
            Some(low) if low != 0.0 => reference * (low / 100.0),
            _ => min_profit,
        };
        let band = config.corridor_bound_percent / 100.0;

        let mut sell_price = reference + profit;
        if sell_price < low_profit {
            sell_price = low_profit;
        }
        if sell_price > reference * (1.0 + band) {
            sell_price = reference * (1.0 + band);
        }
        sell_price *= config.sell_algorithm_coefficient;

        let mut buy_price = reference - min_profit;
        if buy_price < low_profit {
            buy_price = low_profit;
        }
        if buy_price < reference * (1.0 - band) {
            buy_price = reference * (1.0 - band);
        }
        buy_price *= config.buy_algorithm_coefficient;

        let buy_price = buy_price.max(config.minimum_price);
        let sell_price = sell_price.max(config.minimum_price);
        quote_metrics(buy_price, buy_price, sell_price, config.fee_rate)
    }
}

impl PricingStrategy for CorridorBoundStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CorridorBound
    }

    fn price(&self, baseline: f64, sticker_markup: f64, config: &PricingConfig) -> StrategyOutcome {
        let reference = (baseline + sticker_markup).max(config.minimum_price);
        let quote = self.quote_for(reference, config);
        StrategyOutcome { initial: quote, accepted: quote, steps: 0 }
    }
}

/// Strategy implementation for a configured kind
pub fn strategy_for(kind: StrategyKind) -> Box<dyn PricingStrategy> {
    match kind {
        StrategyKind::ProfitSearch => Box::new(ProfitSearchStrategy::after_fees()),
        StrategyKind::PreFeeProfitSearch => Box::new(ProfitSearchStrategy::before_fees()),
        StrategyKind::CorridorBound => Box::new(CorridorBoundStrategy),
    }
}
