//! Error types for the pricing engine

use thiserror::Error;

/// Result type for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while pricing an item
#[derive(Error, Debug)]
pub enum PricingError {
    #[error(
        "Insufficient price data: no points left after filtering \
         ({total} received, {in_window} inside the analysis window)"
    )]
    InsufficientData { total: usize, in_window: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Order book has a zero quantity at best level \
         (buy: {buy_quantity}, sell: {sell_quantity})"
    )]
    DivisionByZero { buy_quantity: u64, sell_quantity: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PricingError {
    fn from(err: toml::de::Error) -> Self {
        PricingError::ConfigLoad(err.to_string())
    }
}

impl From<toml::ser::Error> for PricingError {
    fn from(err: toml::ser::Error) -> Self {
        PricingError::ConfigLoad(err.to_string())
    }
}
