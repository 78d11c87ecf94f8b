//! # duolog
//!
//! A dual-sink text logger: every message is tagged with a log type and
//! delivered to a console stream and/or a size-rotated log file.
//!
//! ## Features
//!
//! - **Open type registry**: the built-in debug/info/warn/error/critical
//!   types are ordinary entries; user-defined types with their own levels,
//!   display names and terminal styling are first class
//! - **Level gating**: per-sink min/max thresholds derive each type's enable
//!   flags, with per-type forced overrides that gating never touches
//! - **File rotation**: numbered log files with a size cap and an optional
//!   limit on how many are retained
//!
//! ## Example
//!
//! ```no_run
//! use duolog::prelude::*;
//!
//! fn main() -> duolog::Result<()> {
//!     let mut logger = Logger::builder()
//!         .name("app")
//!         .file_basename("app")
//!         .max_file_size_mb(10.0)
//!         .file_min_level(20)
//!         .build()?;
//!
//!     logger.add_log_type(
//!         "audit",
//!         LogTypeSpec::new().with_level(50.0).with_color("cyan"),
//!     )?;
//!
//!     logger.info("starting up")?;
//!     logger.log("audit", "user signed in")?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Clock, FooterHook, LevelSpec, LogType, LogTypeSpec, Logger, LoggerBuilder, LoggerError,
        LoggerOptions, Result, SharedLogger, Sink, StackFrame, StyleCodes, StyleTable, Traceback,
        TypeRegistry,
    };
    pub use crate::sinks::{ConsoleStream, RollPolicy, RollingFileSink};
}

pub use crate::core::{
    Clock, FooterHook, LevelSpec, LogType, LogTypeSpec, Logger, LoggerBuilder, LoggerError,
    LoggerOptions, Result, SharedLogger, Sink, StackFrame, StyleCodes, StyleTable, Traceback,
    TypeRegistry, HEADER_TIME_FORMAT,
};
pub use crate::sinks::{ConsoleStream, RollPolicy, RollingFileSink};
