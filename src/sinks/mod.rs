//! Output sinks: the console stream and the rolling log file

pub mod console;
pub mod rolling_file;

pub use console::ConsoleStream;
pub use rolling_file::{RollPolicy, RollingFileSink};
