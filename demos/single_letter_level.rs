//! Single-letter level example
//!
//! Prints levels as D I W E P and wraps every value in delimiters.
//!
//! Run with: cargo run --example single_letter_level

use multilog::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    let options = SinkOptions::default()
        .with_level(Level::Perf)
        .with_single_letter_level(true)
        .with_value_delimiters("<", ">");
    let logger = Logger::new(vec![Arc::new(ConsoleSink::new(options))]);

    logger.perf("Cache warmed", &[]);
    logger.debug("Debugging", &[]);
    logger.info("Info message", &[]);
    logger.warnf(format_args!("Temperature is {} degrees", 80));
    logger.error("Failed to connect", &[attr("host", "db-1")]);

    Ok(())
}
