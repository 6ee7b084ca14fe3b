//! YAML configuration example
//!
//! Builds a console sink, a rotating text file and a rotating JSON file
//! from one configuration document.
//!
//! Run with: cargo run --example config_usage

use multilog::prelude::*;

const CONFIG: &str = r#"
multilog:
  handlers:
    - type: console
      level: info
      enabled: true
      pattern: "[date] - [[time]] [[level]] [msg]"
    - type: file
      subtype: text
      level: debug
      enabled: true
      pattern: "[datetime] [level] [msg] [source]"
      file: logs/app.log
      max_size: 5
      max_backups: 3
      max_age: 7
    - type: file
      subtype: json
      level: warn
      enabled: true
      pattern_placeholders: "[datetime], [level], [msg], [source]"
      file: logs/app.json
"#;

fn main() -> Result<()> {
    println!("=== multilog - Configuration Example ===\n");

    let config: Config = CONFIG.parse()?;
    for handler in config.enabled_handlers() {
        println!("handler: {} {}", handler.handler_type, handler.level);
    }

    let logger = Logger::from_config(&config)?;
    logger.debug("Only in logs/app.log", &[]);
    logger.info("Console and text file", &[attr("user", "john")]);
    logger.warn("Everywhere", &[attr("free_mb", 12)]);
    logger.error("Everywhere, with source", &[]);

    println!("\nWrote logs/app.log and logs/app.json");
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
