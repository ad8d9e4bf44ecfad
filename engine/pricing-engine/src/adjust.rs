//! Post-quote adjustments: order-book skew, pre-order / pre-sale overrides
//! and the marketplace minimum.

use crate::error::{PricingError, Result};
use crate::models::{Adjustment, OrderBookSnapshot};
use tracing::info;

/// Buy/sell pair being adjusted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prices {
    pub buy: f64,
    pub sell: f64,
}

impl Prices {
    pub fn new(buy: f64, sell: f64) -> Self {
        Self { buy, sell }
    }
}

/// Skew prices by best-level depth.
///
/// More buyers than sellers raises the buy price by `buy_q / sell_q`
/// (rounded up); more sellers than buyers lowers the sell price by the same
/// ratio (rounded down). A zero quantity on either side is rejected.
pub fn skew_by_order_book(
    prices: &mut Prices,
    book: &OrderBookSnapshot,
) -> Result<Option<Adjustment>> {
    if book.buy_quantity == 0 || book.sell_quantity == 0 {
        return Err(PricingError::DivisionByZero {
            buy_quantity: book.buy_quantity,
            sell_quantity: book.sell_quantity,
        });
    }

    let ratio = book.buy_quantity as f64 / book.sell_quantity as f64;
    let adjustment = if book.buy_quantity > book.sell_quantity {
        let from = prices.buy;
        prices.buy = (prices.buy * ratio).ceil();
        Some(Adjustment::DemandSkew { from, to: prices.buy })
    } else if book.sell_quantity > book.buy_quantity {
        let from = prices.sell;
        prices.sell = (prices.sell * ratio).floor();
        Some(Adjustment::SupplySkew { from, to: prices.sell })
    } else {
        None
    };

    if let Some(adj) = &adjustment {
        info!(
            "Order book skew (buy qty {}, sell qty {}): {:?}",
            book.buy_quantity, book.sell_quantity, adj
        );
    }
    Ok(adjustment)
}

/// Adopt the best outstanding buy order plus one minor unit when that is cheaper
pub fn apply_pre_order(
    prices: &mut Prices,
    observed: f64,
    minor_unit: f64,
) -> Result<Option<Adjustment>> {
    check_observed("pre-order", observed)?;
    let scale = 1.0 / minor_unit;
    let candidate = (observed * scale + 1.0).floor() / scale;
    if candidate < prices.buy {
        let from = prices.buy;
        prices.buy = candidate;
        info!("Adjusted buy price before order: {} -> {}", from, candidate);
        return Ok(Some(Adjustment::PreOrder { observed, from, to: candidate }));
    }
    Ok(None)
}

/// Adopt the best listing minus one minor unit when that sells higher
pub fn apply_pre_sale(
    prices: &mut Prices,
    observed: f64,
    minor_unit: f64,
) -> Result<Option<Adjustment>> {
    check_observed("pre-sale", observed)?;
    let scale = 1.0 / minor_unit;
    let candidate = (observed * scale - 1.0).ceil() / scale;
    if candidate > prices.sell {
        let from = prices.sell;
        prices.sell = candidate;
        info!("Adjusted sell price before sale: {} -> {}", from, candidate);
        return Ok(Some(Adjustment::PreSale { observed, from, to: candidate }));
    }
    Ok(None)
}

/// Lift both prices to the marketplace minimum
pub fn clamp_to_minimum(prices: &mut Prices, minimum_price: f64) -> Vec<Adjustment> {
    let mut adjustments = Vec::new();
    if prices.buy < minimum_price {
        adjustments.push(Adjustment::MinimumPrice { from: prices.buy, to: minimum_price });
        prices.buy = minimum_price;
    }
    if prices.sell < minimum_price {
        adjustments.push(Adjustment::MinimumPrice { from: prices.sell, to: minimum_price });
        prices.sell = minimum_price;
    }
    adjustments
}

fn check_observed(what: &str, observed: f64) -> Result<()> {
    if observed.is_finite() && observed > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidInput(format!(
            "{} snapshot price must be positive, got {}",
            what, observed
        )))
    }
}
