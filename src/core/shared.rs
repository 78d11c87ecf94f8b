//! Shared logger handle
//!
//! A [`Logger`] is single-owner by design. When one logger must serve
//! several owners or threads, [`SharedLogger`] wraps it in a mutex and hands
//! out cloneable handles; the mutex is the external serialization the plain
//! logger requires. Each call locks for the duration of one operation.
//! Independent loggers remain constructible side by side, so there is no
//! ambient process-wide instance to fight over in tests.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::core::error::Result;
use crate::core::logger::Logger;
use crate::core::traceback::Traceback;

#[derive(Clone)]
pub struct SharedLogger {
    inner: Arc<Mutex<Logger>>,
}

impl SharedLogger {
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Lock the underlying logger for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, Logger> {
        self.inner.lock()
    }

    pub fn log<'m>(&self, log_type: &str, message: &'m str) -> Result<&'m str> {
        self.inner.lock().log(log_type, message)
    }

    pub fn log_with<'m>(
        &self,
        log_type: &str,
        message: &'m str,
        data: Option<&dyn fmt::Display>,
        traceback: Option<&Traceback>,
    ) -> Result<&'m str> {
        self.inner.lock().log_with(log_type, message, data, traceback)
    }

    pub fn debug<'m>(&self, message: &'m str) -> Result<&'m str> {
        self.log("debug", message)
    }

    pub fn info<'m>(&self, message: &'m str) -> Result<&'m str> {
        self.log("info", message)
    }

    pub fn warn<'m>(&self, message: &'m str) -> Result<&'m str> {
        self.log("warn", message)
    }

    pub fn error<'m>(&self, message: &'m str) -> Result<&'m str> {
        self.log("error", message)
    }

    pub fn critical<'m>(&self, message: &'m str) -> Result<&'m str> {
        self.log("critical", message)
    }

    pub fn flush(&self) {
        self.inner.lock().flush();
    }
}

impl Logger {
    /// Move this logger behind a cloneable, mutex-guarded handle.
    #[must_use]
    pub fn into_shared(self) -> SharedLogger {
        SharedLogger::new(self)
    }
}

impl fmt::Debug for SharedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLogger")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
