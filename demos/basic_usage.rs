//! Basic logger usage example
//!
//! Demonstrates console logging at every level, structured attributes,
//! derived loggers and the logging macros.
//!
//! Run with: cargo run --example basic_usage

use multilog::prelude::*;
use multilog::{info, warnf};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== multilog - Basic Usage Example ===\n");

    let console = ConsoleSink::new(
        SinkOptions::default()
            .with_level(Level::Perf)
            .with_pattern("[time] [level] [msg] [source]")
            .with_add_source(true),
    );
    let logger = Logger::new(vec![Arc::new(console)]);

    println!("1. Logging at different levels:");
    logger.perf("This is a perf message", &[]);
    logger.debug("This is a debug message", &[]);
    logger.info("This is an info message", &[]);
    logger.warn("This is a warning message", &[]);
    logger.error("This is an error message", &[]);

    println!("\n2. Structured attributes:");
    logger.info("User action", &[attr("user", "john"), attr("action", "login")]);
    logger.warnf(format_args!("Temperature is {} degrees", 80));

    println!("\n3. Derived loggers:");
    let request = logger.with_field("service", "api").with_group("req");
    request.info("served", &[attr("status", 200)]);

    println!("\n4. Macros:");
    info!(logger, "From a macro", "attempt" => 3);
    warnf!(logger, "Disk {}% full", 91);

    println!("\n5. Context-bound logger:");
    let ctx = Context::background().with_value("request_id", "r-42");
    logger.with_context(ctx).info("with context", &[]);

    println!("\nLogged {} records", logger.metrics().total_logged());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
