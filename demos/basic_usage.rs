//! Basic logger usage
//!
//! Demonstrates the built-in types, user-defined types with styling, and
//! per-sink level thresholds.
//!
//! Run with: cargo run --example basic_usage

use duolog::prelude::*;

fn main() -> duolog::Result<()> {
    let mut logger = Logger::builder()
        .name("demo")
        .file_basename("demo")
        .build()?;

    // the five built-in types
    logger.debug("This is a debug message")?;
    logger.info("This is an info message")?;
    logger.warn("This is a warning message")?;
    logger.error("This is an error message")?;
    logger.critical("This is a critical message")?;

    // a user-defined type with styling
    logger.add_log_type(
        "super critical",
        LogTypeSpec::new()
            .with_name("SUPER CRITICAL")
            .with_level(200.0)
            .with_color("red")
            .with_attributes(["bold", "underline"]),
    )?;
    logger.log("super critical", "Styled when the terminal supports it")?;

    // raise the console minimum: debug and info fall silent on stdout
    logger.set_minimum_level(Sink::Stdout, Some("warn".into()))?;
    logger.debug("Hidden from the console, still in the file")?;
    logger.warn("Still visible on both sinks")?;

    // the registry renders as a table
    println!("\n{}", logger);

    println!("last logged: {:?}", logger.last_logged_message());
    Ok(())
}
