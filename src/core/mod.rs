//! Core logger types

pub mod clock;
pub mod error;
pub mod logger;
pub mod registry;
pub mod shared;
pub mod style;
pub mod traceback;

pub use clock::{Clock, HEADER_TIME_FORMAT};
pub use error::{LoggerError, Result};
pub use logger::{FooterHook, Logger, LoggerBuilder, LoggerOptions};
pub use registry::{LevelSpec, LogType, LogTypeSpec, Sink, TypeRegistry};
pub use shared::SharedLogger;
pub use style::{StyleCodes, StyleTable};
pub use traceback::{StackFrame, Traceback};
