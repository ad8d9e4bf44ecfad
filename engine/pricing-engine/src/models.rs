use crate::config::StrategyKind;
use crate::error::{PricingError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One historical sale of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_price: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64, sticker_price: Option<f64>) -> Self {
        Self { timestamp, price, sticker_price }
    }

    /// Build a point from a `YYYYMMDD` encoded date (midnight UTC)
    pub fn from_encoded_date(encoded: u32, price: f64, sticker_price: Option<f64>) -> Result<Self> {
        let year = (encoded / 10_000) as i32;
        let month = (encoded / 100) % 100;
        let day = encoded % 100;
        let invalid = || PricingError::InvalidInput(format!("invalid encoded date {}", encoded));
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let timestamp = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();
        Ok(Self::new(timestamp, price, sticker_price))
    }

    /// Sticker price when one is attached; a zero price means no sticker
    pub fn sticker_value(&self) -> Option<f64> {
        self.sticker_price.filter(|price| *price > 0.0)
    }

    pub fn has_sticker(&self) -> bool {
        self.sticker_value().is_some()
    }
}

/// How the caller ordered a sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Price history for a single item, in the order the caller received it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(default)]
    pub order: SampleOrder,
    pub points: Vec<PricePoint>,
}

impl PriceSample {
    pub fn new(order: SampleOrder, points: Vec<PricePoint>) -> Self {
        Self { order, points }
    }

    pub fn newest_first(points: Vec<PricePoint>) -> Self {
        Self::new(SampleOrder::NewestFirst, points)
    }

    pub fn oldest_first(points: Vec<PricePoint>) -> Self {
        Self::new(SampleOrder::OldestFirst, points)
    }

    /// Parse a sample from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point according to the declared order
    pub fn latest(&self) -> Option<&PricePoint> {
        match self.order {
            SampleOrder::NewestFirst => self.points.first(),
            SampleOrder::OldestFirst => self.points.last(),
        }
    }

    /// Points from newest to oldest regardless of storage order
    pub fn iter_recent(&self) -> Box<dyn Iterator<Item = &PricePoint> + '_> {
        match self.order {
            SampleOrder::NewestFirst => Box::new(self.points.iter()),
            SampleOrder::OldestFirst => Box::new(self.points.iter().rev()),
        }
    }

    /// Keep the points matching `predicate`, preserving order
    pub fn retain_where(&self, predicate: impl Fn(&PricePoint) -> bool) -> PriceSample {
        PriceSample {
            order: self.order,
            points: self.points.iter().filter(|p| predicate(p)).cloned().collect(),
        }
    }
}

/// Best-level depth of the live order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub buy_quantity: u64,
    pub sell_quantity: u64,
}

impl OrderBookSnapshot {
    pub fn new(buy_quantity: u64, sell_quantity: u64) -> Self {
        Self { buy_quantity, sell_quantity }
    }
}

/// Prices and profit figures produced by a strategy before any adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Raw buy price taken from history (plus search increments)
    pub buy_price: f64,
    /// Buy price including the sticker markup, used as cost basis
    pub cost_basis: f64,
    pub sell_price: f64,
    pub fee: f64,
    pub profit_before_fees: f64,
    pub profit_after_fees: f64,
}

impl Quote {
    /// Sell price after the platform fee
    pub fn net_proceeds(&self) -> f64 {
        self.sell_price - self.fee
    }
}

/// A post-processing step that changed a price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Buy price raised because demand exceeds supply
    DemandSkew { from: f64, to: f64 },
    /// Sell price lowered because supply exceeds demand
    SupplySkew { from: f64, to: f64 },
    /// Buy price lowered to just above the best outstanding buy order
    PreOrder { observed: f64, from: f64, to: f64 },
    /// Sell price raised to just below the best listing
    PreSale { observed: f64, from: f64, to: f64 },
    /// Price raised to the marketplace minimum
    MinimumPrice { from: f64, to: f64 },
}

/// Final pricing recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit_before_fees: f64,
    pub profit_after_fees: f64,
    pub sticker_markup_applied: f64,
    pub sticker_markup_when_selling: f64,
    /// Fee of the base quote
    pub fee: f64,
    /// Base quote sell price minus its fee
    pub net_proceeds: f64,
    pub strategy: StrategyKind,
    pub search_steps: u32,
    pub adjustments: Vec<Adjustment>,
}
