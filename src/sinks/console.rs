//! Console sink
//!
//! The console side of the logger writes to process stdout, stderr, or any
//! caller-supplied stream. Styling support is probed once per stream: the
//! real standard streams are checked for a terminal with color support, and
//! custom streams are always treated as unstyled since there is nothing to
//! probe. Console writes are best-effort; the stream can vanish under the
//! host process and logging must not take it down.

use std::fmt;
use std::io::{self, IsTerminal, Write};

/// Where console-side output goes.
#[derive(Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
    /// Any write-capable sink, e.g. an in-memory buffer in tests.
    Custom(Box<dyn Write + Send>),
}

impl ConsoleStream {
    /// Probe whether the stream accepts ANSI styling.
    ///
    /// Any failure mode (custom stream, non-tty, dumb terminal, NO_COLOR)
    /// resolves to unstyled.
    #[must_use]
    pub fn supports_styling(&self) -> bool {
        match self {
            ConsoleStream::Stdout => io::stdout().is_terminal() && env_allows_color(),
            ConsoleStream::Stderr => io::stderr().is_terminal() && env_allows_color(),
            ConsoleStream::Custom(_) => false,
        }
    }

    pub(crate) fn write_line(&mut self, line: &str) {
        let _ = match self {
            ConsoleStream::Stdout => io::stdout().write_all(line.as_bytes()),
            ConsoleStream::Stderr => io::stderr().write_all(line.as_bytes()),
            ConsoleStream::Custom(stream) => stream.write_all(line.as_bytes()),
        };
    }

    pub(crate) fn flush(&mut self) {
        let _ = match self {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
            ConsoleStream::Custom(stream) => stream.flush(),
        };
    }
}

impl fmt::Debug for ConsoleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStream::Stdout => f.write_str("Stdout"),
            ConsoleStream::Stderr => f.write_str("Stderr"),
            ConsoleStream::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn env_allows_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match std::env::var("TERM") {
        Ok(term) => !term.is_empty() && term != "dumb",
        // TERM is absent on Windows terminals that still render ANSI
        Err(_) => cfg!(windows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_stream_is_unstyled() {
        let stream = ConsoleStream::Custom(Box::new(Vec::new()));
        assert!(!stream.supports_styling());
    }

    #[test]
    fn test_custom_stream_receives_writes() {
        use std::sync::Arc;

        #[derive(Clone)]
        struct SharedBuf(Arc<parking_lot::Mutex<Vec<u8>>>);

        impl Write for SharedBuf {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buf = SharedBuf(Arc::new(parking_lot::Mutex::new(Vec::new())));
        let mut stream = ConsoleStream::Custom(Box::new(buf.clone()));
        stream.write_line("hello\n");
        stream.flush();
        assert_eq!(&*buf.0.lock(), b"hello\n");
    }
}
