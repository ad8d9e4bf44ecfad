//! Configuration for the pricing engine

use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Platform fee observed on the marketplace (fraction of the sell price)
pub const DEFAULT_FEE_RATE: f64 = 0.15;

/// Smallest price the marketplace accepts for a listing or an order
pub const DEFAULT_MINIMUM_PRICE: f64 = 1.0;

/// Number of most recent sticker-bearing points averaged for the markup
pub const STICKER_WINDOW: usize = 7;

/// Largest accepted `profit_percent`; keeps the profit search short
pub const MAX_PROFIT_PERCENT: f64 = 10_000.0;

/// Which pricing formula produces the base quote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Raise the buy price until post-fee profit reaches the pleasant profit
    #[default]
    ProfitSearch,
    /// Same search, targeting profit before fees (periodic re-adjustment variant)
    PreFeeProfitSearch,
    /// Non-iterative corridor clamps with floor terms and coefficients
    CorridorBound,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyKind::ProfitSearch => "profit_search",
            StrategyKind::PreFeeProfitSearch => "pre_fee_profit_search",
            StrategyKind::CorridorBound => "corridor_bound",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "profit_search" => Ok(StrategyKind::ProfitSearch),
            "pre_fee_profit_search" => Ok(StrategyKind::PreFeeProfitSearch),
            "corridor_bound" => Ok(StrategyKind::CorridorBound),
            other => Err(PricingError::InvalidConfig(format!("unknown strategy '{}'", other))),
        }
    }
}

/// Tunable parameters for a pricing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Formula used for the base quote
    pub strategy: StrategyKind,

    /// Lookback window in days
    pub analysis_period_days: u32,

    /// Corridor in percent of the median-normalized scale (0-50)
    pub corridor_percent: f64,

    /// Target markup applied to the buy price, in percent
    pub profit_percent: f64,

    /// Minimum acceptable profit percent before the search stops raising the buy price
    pub pleasant_profit: f64,

    /// Floor adjustment below the baseline for the buy side, in percent (corridor-bound only)
    pub min_profit: f64,

    /// Lower bound for both prices, in percent of the baseline (corridor-bound only).
    /// Falls back to `min_profit` when absent or zero.
    pub low_profit: Option<f64>,

    /// Clamp band around the baseline, in percent (corridor-bound only)
    pub corridor_bound_percent: f64,

    /// Final multiplier on the sell price (corridor-bound only)
    pub sell_algorithm_coefficient: f64,

    /// Final multiplier on the buy price (corridor-bound only)
    pub buy_algorithm_coefficient: f64,

    /// Add a sticker premium to the baseline
    pub include_stickers: bool,

    /// Sticker premium in percent of the average sticker price
    pub sticker_markup_percent: f64,

    /// Lowest sticker premium applied once stickers are priced
    pub minimum_sticker_markup: f64,

    /// Fraction of the sell price retained by the platform
    pub fee_rate: f64,

    /// Smallest price the marketplace accepts
    pub minimum_price: f64,

    /// Buy price increment used by the profit search
    pub price_step: f64,

    /// Currency minor unit used to outbid observed orders and listings
    pub minor_unit: f64,

    /// How often the external re-poller should re-run pricing, in seconds
    pub profit_update_interval_secs: Option<u64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::ProfitSearch,
            analysis_period_days: 30,
            corridor_percent: 5.0,
            profit_percent: 10.0,
            pleasant_profit: 20.0,
            min_profit: 5.0,
            low_profit: Some(2.0),
            corridor_bound_percent: 5.0,
            sell_algorithm_coefficient: 1.2,
            buy_algorithm_coefficient: 0.8,
            include_stickers: false,
            sticker_markup_percent: 5.0,
            minimum_sticker_markup: 0.03,
            fee_rate: DEFAULT_FEE_RATE,
            minimum_price: DEFAULT_MINIMUM_PRICE,
            price_step: 1.0,
            minor_unit: 0.01,
            profit_update_interval_secs: None,
        }
    }
}

impl PricingConfig {
    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.analysis_period_days == 0 {
            return Err(invalid("analysis_period_days must be at least 1"));
        }
        if !(0.0..=50.0).contains(&self.corridor_percent) {
            return Err(invalid(format!(
                "corridor_percent must be within 0-50, got {}",
                self.corridor_percent
            )));
        }
        if !(0.0..=100.0).contains(&self.corridor_bound_percent) {
            return Err(invalid(format!(
                "corridor_bound_percent must be within 0-100, got {}",
                self.corridor_bound_percent
            )));
        }
        if !self.profit_percent.is_finite()
            || self.profit_percent <= -100.0
            || self.profit_percent > MAX_PROFIT_PERCENT
        {
            return Err(invalid(format!(
                "profit_percent must be within (-100, {}], got {}",
                MAX_PROFIT_PERCENT, self.profit_percent
            )));
        }
        finite("pleasant_profit", self.pleasant_profit)?;
        finite("min_profit", self.min_profit)?;
        if let Some(low_profit) = self.low_profit {
            finite("low_profit", low_profit)?;
        }
        positive("sell_algorithm_coefficient", self.sell_algorithm_coefficient)?;
        positive("buy_algorithm_coefficient", self.buy_algorithm_coefficient)?;
        non_negative("sticker_markup_percent", self.sticker_markup_percent)?;
        non_negative("minimum_sticker_markup", self.minimum_sticker_markup)?;
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(invalid(format!("fee_rate must be within [0, 1), got {}", self.fee_rate)));
        }
        positive("minimum_price", self.minimum_price)?;
        positive("price_step", self.price_step)?;
        positive("minor_unit", self.minor_unit)?;
        if self.profit_update_interval_secs == Some(0) {
            return Err(invalid("profit_update_interval_secs must be positive when set"));
        }
        Ok(())
    }

    /// Lookback window as a chrono duration
    pub fn analysis_period(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.analysis_period_days))
    }

    /// Re-poll interval for the external scheduler, if configured
    pub fn profit_update_interval(&self) -> Option<Duration> {
        self.profit_update_interval_secs.map(Duration::from_secs)
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `PRICING_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(strategy) = env_var("PRICING_STRATEGY") {
            self.strategy = strategy.parse()?;
        }
        if let Some(days) = env_parse("PRICING_ANALYSIS_PERIOD_DAYS")? {
            self.analysis_period_days = days;
        }
        if let Some(corridor) = env_parse("PRICING_CORRIDOR_PERCENT")? {
            self.corridor_percent = corridor;
        }
        if let Some(profit) = env_parse("PRICING_PROFIT_PERCENT")? {
            self.profit_percent = profit;
        }
        if let Some(pleasant) = env_parse("PRICING_PLEASANT_PROFIT")? {
            self.pleasant_profit = pleasant;
        }
        if let Some(include) = env_parse("PRICING_INCLUDE_STICKERS")? {
            self.include_stickers = include;
        }
        if let Some(markup) = env_parse("PRICING_STICKER_MARKUP_PERCENT")? {
            self.sticker_markup_percent = markup;
        }
        if let Some(minimum) = env_parse("PRICING_MINIMUM_STICKER_MARKUP")? {
            self.minimum_sticker_markup = minimum;
        }
        if let Some(fee_rate) = env_parse("PRICING_FEE_RATE")? {
            self.fee_rate = fee_rate;
        }
        Ok(())
    }

    /// Load configuration from a TOML file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PricingConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn invalid(msg: impl Into<String>) -> PricingError {
    PricingError::InvalidConfig(msg.into())
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{} must be finite, got {}", name, value)))
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must not be negative, got {}", name, value)))
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                PricingError::ConfigLoad(format!("{} has an unparsable value '{}'", key, raw))
            }),
        None => Ok(None),
    }
}
