use crate::adjust::{apply_pre_order, apply_pre_sale, clamp_to_minimum, skew_by_order_book, Prices};
use crate::config::PricingConfig;
use crate::error::{PricingError, Result};
use crate::filter::filter_sample;
use crate::models::*;
use crate::sticker::sticker_markup;
use crate::strategy::{strategy_for, CorridorBoundStrategy, StrategyOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Inputs of one pricing run
#[derive(Debug, Clone)]
pub struct PricingRequest<'a> {
    pub sample: &'a PriceSample,
    pub now: DateTime<Utc>,
    pub order_book: Option<OrderBookSnapshot>,
    pub pre_order: Option<f64>,
    pub pre_sale: Option<f64>,
}

impl<'a> PricingRequest<'a> {
    pub fn new(sample: &'a PriceSample, now: DateTime<Utc>) -> Self {
        Self { sample, now, order_book: None, pre_order: None, pre_sale: None }
    }

    pub fn with_order_book(mut self, order_book: OrderBookSnapshot) -> Self {
        self.order_book = Some(order_book);
        self
    }

    /// Best outstanding buy order observed before placing ours
    pub fn with_pre_order(mut self, price: f64) -> Self {
        self.pre_order = Some(price);
        self
    }

    /// Best current listing observed before listing ours
    pub fn with_pre_sale(mut self, price: f64) -> Self {
        self.pre_sale = Some(price);
        self
    }
}

/// Buy/sell pair for one retained history point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub buy_price: f64,
    pub sell_price: f64,
}

/// Price calculator holding a validated configuration
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    config: PricingConfig,
}

impl PriceCalculator {
    /// Create a new price calculator; fails on an invalid configuration
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price an item: filter history, quote with the configured strategy,
    /// then apply order-book skew and snapshot overrides.
    pub fn compute(&self, request: &PricingRequest<'_>) -> Result<PricingResult> {
        let config = &self.config;
        let filtered = filter_sample(request.sample, config, request.now)?;
        let baseline = filtered
            .latest()
            .map(|p| p.price)
            .ok_or(PricingError::InsufficientData { total: request.sample.len(), in_window: 0 })?;

        let markup = sticker_markup(&filtered, config);
        let strategy = strategy_for(config.strategy);
        let outcome = strategy.price(baseline, markup, config);

        debug!(
            "Base quote ({}): baseline {}, markup {:.4}, buy {}, sell {}, fee {}, {} search steps",
            strategy.kind(),
            baseline,
            markup,
            outcome.accepted.buy_price,
            outcome.accepted.sell_price,
            outcome.accepted.fee,
            outcome.steps
        );

        let mut prices = Prices::new(outcome.accepted.buy_price, outcome.accepted.sell_price);
        let mut adjustments = Vec::new();

        if let Some(book) = &request.order_book {
            adjustments.extend(skew_by_order_book(&mut prices, book)?);
        }
        if let Some(observed) = request.pre_order {
            adjustments.extend(apply_pre_order(&mut prices, observed, config.minor_unit)?);
        }
        if let Some(observed) = request.pre_sale {
            adjustments.extend(apply_pre_sale(&mut prices, observed, config.minor_unit)?);
        }
        adjustments.extend(clamp_to_minimum(&mut prices, config.minimum_price));

        let result = PricingResult {
            buy_price: prices.buy,
            sell_price: prices.sell,
            profit_before_fees: outcome.accepted.profit_before_fees,
            profit_after_fees: outcome.accepted.profit_after_fees,
            sticker_markup_applied: markup,
            sticker_markup_when_selling: self.markup_when_selling(&outcome),
            fee: outcome.accepted.fee,
            net_proceeds: outcome.accepted.net_proceeds(),
            strategy: strategy.kind(),
            search_steps: outcome.steps,
            adjustments,
        };

        info!(
            "Priced item with {}: buy {}, sell {}, profit {}% before fees / {}% after fees",
            result.strategy,
            result.buy_price,
            result.sell_price,
            result.profit_before_fees,
            result.profit_after_fees
        );

        Ok(result)
    }

    /// Corridor-bound buy/sell pair for every retained point, in sample order
    pub fn price_series(
        &self,
        sample: &PriceSample,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeriesEntry>> {
        let config = &self.config;
        let filtered = filter_sample(sample, config, now)?;
        let markup = sticker_markup(&filtered, config);
        let strategy = CorridorBoundStrategy;

        Ok(filtered
            .points
            .iter()
            .map(|point| {
                let reference = (point.price + markup).max(config.minimum_price);
                let quote = strategy.quote_for(reference, config);
                SeriesEntry {
                    timestamp: point.timestamp,
                    price: point.price,
                    buy_price: quote.buy_price,
                    sell_price: quote.sell_price,
                }
            })
            .collect())
    }

    /// Share of the post-fee profit attributable to stickers once the search
    /// settled on a different fee than the first quote.
    ///
    /// Zero unless an accepted search step crosses a fee boundary, which only
    /// happens for a few cost bases per configuration.
    fn markup_when_selling(&self, outcome: &StrategyOutcome) -> f64 {
        if !self.config.include_stickers {
            return 0.0;
        }
        let initial = &outcome.initial;
        let cost = initial.cost_basis;
        let settled_profit =
            ((initial.sell_price - cost - outcome.accepted.fee) / cost * 100.0).floor();
        (settled_profit - initial.profit_after_fees) * cost / 100.0
    }
}
