//! # Pricing CLI Binary
//!
//! Prices a marketplace item from a local price-history file.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{load_configuration, Cli, CliHandler};
use tracing::debug;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    logging::initialize_logging_with_config(&cli.log_level, &cli.log_format)?;
    debug!("pricing-cli v{} (engine v{})", env!("CARGO_PKG_VERSION"), pricing_engine::VERSION);

    let config = load_configuration(cli.config.as_deref()).context("Failed to load configuration")?;
    let handler = CliHandler::new(config);

    let output = handler.handle_command(cli.command)?;
    println!("{}", output);

    Ok(())
}
