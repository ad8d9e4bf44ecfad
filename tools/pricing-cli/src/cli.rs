//! # Command Line Interface
//!
//! Loads a price sample and a configuration from local files and prints the
//! pricing recommendation as JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use pricing_engine::{
    OrderBookSnapshot, PriceCalculator, PriceSample, PricingConfig, PricingRequest, StrategyKind,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Marketplace pricing calculator
#[derive(Parser, Debug)]
#[command(name = "pricing-cli")]
#[command(about = "Compute buy/sell prices from marketplace price history")]
pub struct Cli {
    /// TOML configuration file (defaults apply for missing fields)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log format (text, json, pretty)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price an item from its history and optional live snapshots
    Quote {
        #[command(flatten)]
        input: SampleArgs,

        /// Quantity at the best buy level of the order book
        #[arg(long, requires = "sell_quantity")]
        buy_quantity: Option<u64>,

        /// Quantity at the best sell level of the order book
        #[arg(long, requires = "buy_quantity")]
        sell_quantity: Option<u64>,

        /// Best outstanding buy order observed before ordering
        #[arg(long)]
        pre_order: Option<f64>,

        /// Best current listing observed before selling
        #[arg(long)]
        pre_sale: Option<f64>,
    },
    /// Corridor-bound buy/sell pair for every retained history point
    Series {
        #[command(flatten)]
        input: SampleArgs,
    },
    /// Print the effective configuration as TOML
    ShowConfig {
        /// Override the configured strategy
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// JSON price sample file
    #[arg(short, long)]
    pub sample: PathBuf,

    /// Evaluation time (RFC 3339), defaults to now
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Override the configured strategy
    #[arg(long)]
    pub strategy: Option<StrategyKind>,
}

/// Resolve configuration: defaults, then the file, then `PRICING_*` variables
pub fn load_configuration(path: Option<&Path>) -> Result<PricingConfig> {
    let mut config = match path {
        Some(path) => PricingConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PricingConfig::default(),
    };
    config.apply_env().context("Failed to apply environment overrides")?;
    Ok(config)
}

fn load_sample(path: &Path) -> Result<PriceSample> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read price sample {}", path.display()))?;
    PriceSample::from_json(&raw)
        .with_context(|| format!("Failed to parse price sample {}", path.display()))
}

/// CLI handler
pub struct CliHandler {
    config: PricingConfig,
}

impl CliHandler {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Handle a command and return what should be printed
    pub fn handle_command(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Quote { input, buy_quantity, sell_quantity, pre_order, pre_sale } => {
                let order_book = match (buy_quantity, sell_quantity) {
                    (Some(buy), Some(sell)) => Some(OrderBookSnapshot::new(buy, sell)),
                    _ => None,
                };
                self.quote(&input, order_book, pre_order, pre_sale)
            }
            Commands::Series { input } => self.series(&input),
            Commands::ShowConfig { strategy } => {
                let config = self.config_with(strategy);
                config.validate().context("Configuration is invalid")?;
                Ok(config.to_toml()?)
            }
        }
    }

    fn calculator(&self, strategy: Option<StrategyKind>) -> Result<PriceCalculator> {
        PriceCalculator::new(self.config_with(strategy)).context("Configuration is invalid")
    }

    fn config_with(&self, strategy: Option<StrategyKind>) -> PricingConfig {
        let mut config = self.config.clone();
        if let Some(strategy) = strategy {
            config.strategy = strategy;
        }
        config
    }

    fn quote(
        &self,
        input: &SampleArgs,
        order_book: Option<OrderBookSnapshot>,
        pre_order: Option<f64>,
        pre_sale: Option<f64>,
    ) -> Result<String> {
        let sample = load_sample(&input.sample)?;
        let calculator = self.calculator(input.strategy)?;
        let now = input.now.unwrap_or_else(Utc::now);

        info!("Pricing {} history points from {}", sample.len(), input.sample.display());

        let request = PricingRequest { sample: &sample, now, order_book, pre_order, pre_sale };
        let result = calculator.compute(&request).context("Pricing failed")?;
        Ok(serde_json::to_string_pretty(&result)?)
    }

    fn series(&self, input: &SampleArgs) -> Result<String> {
        let sample = load_sample(&input.sample)?;
        let calculator = self.calculator(input.strategy)?;
        let now = input.now.unwrap_or_else(Utc::now);
        let series = calculator.price_series(&sample, now).context("Pricing failed")?;
        Ok(serde_json::to_string_pretty(&series)?)
    }
}
