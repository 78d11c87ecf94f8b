//! The logger façade
//!
//! A [`Logger`] owns a type registry, a console stream and a rolling file
//! sink, and dispatches each message to whichever sinks the global flags and
//! the message's log type allow. All operations run synchronously on the
//! calling thread. A `Logger` is a single-owner value: its mutable state is
//! not safe for concurrent use without external serialization. See
//! [`SharedLogger`](crate::core::shared::SharedLogger) for the opt-in
//! mutex-wrapped handle.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::clock::Clock;
use crate::core::error::{LoggerError, Result};
use crate::core::registry::{LevelSpec, LogType, LogTypeSpec, Sink, TypeRegistry};
use crate::core::style::StyleTable;
use crate::core::traceback::Traceback;
use crate::sinks::console::ConsoleStream;
use crate::sinks::rolling_file::{RollPolicy, RollingFileSink};

/// Built-in types created at construction, in this order.
const BUILTIN_TYPES: &[(&str, &str, f64)] = &[
    ("debug", "DEBUG", 0.0),
    ("info", "INFO", 10.0),
    ("warn", "WARNING", 20.0),
    ("error", "ERROR", 30.0),
    ("critical", "CRITICAL", 100.0),
];

/// Hook producing the footer appended after the message text.
pub type FooterHook = Box<dyn Fn(&LogType, &str) -> String + Send>;

/// Serializable constructor configuration.
///
/// `log_file`, when set, overrides `file_basename`/`file_extension` with a
/// full path split at its last dot. `initial_log_types` entries are applied
/// after the built-in types: existing keys are patched, new keys added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    pub name: String,
    pub flush_on_write: bool,
    pub log_to_stdout: bool,
    pub log_to_file: bool,
    pub log_file: Option<String>,
    pub file_basename: String,
    pub file_extension: String,
    pub max_file_size_mb: Option<f64>,
    pub first_file_number: Option<u64>,
    pub file_roll_limit: Option<usize>,
    pub stdout_min_level: Option<LevelSpec>,
    pub stdout_max_level: Option<LevelSpec>,
    pub file_min_level: Option<LevelSpec>,
    pub file_max_level: Option<LevelSpec>,
    pub initial_log_types: BTreeMap<String, LogTypeSpec>,
    pub timezone: Option<String>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            name: "logger".to_string(),
            flush_on_write: true,
            log_to_stdout: true,
            log_to_file: true,
            log_file: None,
            file_basename: "duolog".to_string(),
            file_extension: "log".to_string(),
            max_file_size_mb: Some(10.0),
            first_file_number: None,
            file_roll_limit: None,
            stdout_min_level: None,
            stdout_max_level: None,
            file_min_level: None,
            file_max_level: None,
            initial_log_types: BTreeMap::new(),
            timezone: None,
        }
    }
}

/// Builder for [`Logger`], carrying the non-serializable pieces (the console
/// stream and the footer hook) alongside [`LoggerOptions`].
#[derive(Default)]
pub struct LoggerBuilder {
    options: LoggerOptions,
    stdout_stream: Option<ConsoleStream>,
    footer: Option<FooterHook>,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a saved option set.
    #[must_use]
    pub fn from_options(options: LoggerOptions) -> Self {
        Self {
            options,
            stdout_stream: None,
            footer: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = name.into();
        self
    }

    #[must_use]
    pub fn flush_on_write(mut self, flush: bool) -> Self {
        self.options.flush_on_write = flush;
        self
    }

    #[must_use]
    pub fn log_to_stdout(mut self, enabled: bool) -> Self {
        self.options.log_to_stdout = enabled;
        self
    }

    /// Replace the console stream (default: process stdout).
    #[must_use]
    pub fn stdout_stream(mut self, stream: ConsoleStream) -> Self {
        self.stdout_stream = Some(stream);
        self
    }

    #[must_use]
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.options.log_to_file = enabled;
        self
    }

    /// Full log file path; overrides basename and extension.
    #[must_use]
    pub fn log_file(mut self, path: impl Into<String>) -> Self {
        self.options.log_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn file_basename(mut self, basename: impl Into<String>) -> Self {
        self.options.file_basename = basename.into();
        self
    }

    #[must_use]
    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.options.file_extension = extension.into();
        self
    }

    #[must_use]
    pub fn max_file_size_mb(mut self, max_size_mb: impl Into<Option<f64>>) -> Self {
        self.options.max_file_size_mb = max_size_mb.into();
        self
    }

    #[must_use]
    pub fn first_file_number(mut self, first_number: impl Into<Option<u64>>) -> Self {
        self.options.first_file_number = first_number.into();
        self
    }

    #[must_use]
    pub fn file_roll_limit(mut self, roll_limit: impl Into<Option<usize>>) -> Self {
        self.options.file_roll_limit = roll_limit.into();
        self
    }

    #[must_use]
    pub fn stdout_min_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.options.stdout_min_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn stdout_max_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.options.stdout_max_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn file_min_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.options.file_min_level = Some(level.into());
        self
    }

    #[must_use]
    pub fn file_max_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.options.file_max_level = Some(level.into());
        self
    }

    /// Add or patch a log type after the built-ins are created.
    #[must_use]
    pub fn log_type(mut self, key: impl Into<String>, spec: LogTypeSpec) -> Self {
        self.options.initial_log_types.insert(key.into(), spec);
        self
    }

    /// Pin header timestamps to an IANA timezone.
    #[must_use]
    pub fn timezone(mut self, zone: impl Into<String>) -> Self {
        self.options.timezone = Some(zone.into());
        self
    }

    /// Install a footer hook invoked per message after defaults are set.
    #[must_use]
    pub fn footer<F>(mut self, footer: F) -> Self
    where
        F: Fn(&LogType, &str) -> String + Send + 'static,
    {
        self.footer = Some(Box::new(footer));
        self
    }

    /// Build the logger, resolving the active log file eagerly.
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            options,
            stdout_stream,
            footer,
        } = self;
        let clock = match options.timezone.as_deref() {
            Some(zone) => Clock::for_zone(zone)?,
            None => Clock::local(),
        };
        let stdout = stdout_stream.unwrap_or_default();
        let mut registry = TypeRegistry::new(StyleTable::new(stdout.supports_styling()));
        for (key, name, level) in BUILTIN_TYPES {
            registry.add(key, LogTypeSpec::new().with_name(*name).with_level(*level))?;
        }
        registry.set_minimum_level(Sink::Stdout, options.stdout_min_level.clone())?;
        registry.set_maximum_level(Sink::Stdout, options.stdout_max_level.clone())?;
        registry.set_minimum_level(Sink::File, options.file_min_level.clone())?;
        registry.set_maximum_level(Sink::File, options.file_max_level.clone())?;
        for (key, spec) in &options.initial_log_types {
            if registry.is_defined(key) {
                registry.update(key, spec.clone())?;
            } else {
                registry.add(key, spec.clone())?;
            }
        }
        let policy = RollPolicy {
            max_size_mb: options.max_file_size_mb,
            first_number: options.first_file_number,
            roll_limit: options.file_roll_limit,
        };
        let file = match options.log_file.as_deref() {
            Some(path) => RollingFileSink::from_full_path(path, policy)?,
            None => {
                RollingFileSink::new(&options.file_basename, &options.file_extension, policy)?
            }
        };
        Ok(Logger {
            name: options.name,
            flush_on_write: options.flush_on_write,
            log_to_stdout: options.log_to_stdout,
            stdout,
            log_to_file: options.log_to_file,
            file,
            registry,
            clock,
            last_logged: HashMap::new(),
            last_any: None,
            footer,
        })
    }
}

/// Dual-sink text logger with a per-instance log-type registry.
pub struct Logger {
    name: String,
    flush_on_write: bool,
    log_to_stdout: bool,
    stdout: ConsoleStream,
    log_to_file: bool,
    file: RollingFileSink,
    registry: TypeRegistry,
    clock: Clock,
    last_logged: HashMap<String, String>,
    last_any: Option<String>,
    footer: Option<FooterHook>,
}

impl Logger {
    /// A logger with default options.
    pub fn new() -> Result<Self> {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn flush_on_write(&self) -> bool {
        self.flush_on_write
    }

    pub fn set_flush_on_write(&mut self, flush: bool) {
        self.flush_on_write = flush;
    }

    /// Global console gate; when off, no type logs to the console.
    pub fn log_to_stdout(&self) -> bool {
        self.log_to_stdout
    }

    pub fn set_log_to_stdout(&mut self, enabled: bool) {
        self.log_to_stdout = enabled;
    }

    /// Global file gate; when off, no type logs to the file.
    pub fn log_to_file(&self) -> bool {
        self.log_to_file
    }

    pub fn set_log_to_file(&mut self, enabled: bool) {
        self.log_to_file = enabled;
    }

    /// Replace the console stream and re-probe styling support.
    ///
    /// Types registered so far keep their definition-time style codes.
    pub fn set_stdout_stream(&mut self, stream: ConsoleStream) {
        self.registry
            .set_styles(StyleTable::new(stream.supports_styling()));
        self.stdout = stream;
    }

    /// Replace the footer hook; `None` restores the empty default.
    pub fn set_footer(&mut self, footer: Option<FooterHook>) {
        self.footer = footer;
    }

    pub fn set_timezone(&mut self, zone: Option<&str>) -> Result<()> {
        self.clock = match zone {
            Some(zone) => Clock::for_zone(zone)?,
            None => Clock::local(),
        };
        Ok(())
    }

    pub fn timezone(&self) -> Option<&'static str> {
        self.clock.zone()
    }

    // ---- log file -------------------------------------------------------

    /// The currently active log file name.
    pub fn log_file_name(&self) -> &std::path::Path {
        self.file.current_path()
    }

    pub fn log_file_basename(&self) -> std::path::PathBuf {
        self.file.basename()
    }

    pub fn log_file_extension(&self) -> &str {
        self.file.extension()
    }

    pub fn max_file_size_mb(&self) -> Option<f64> {
        self.file.max_size_mb()
    }

    pub fn first_file_number(&self) -> Option<u64> {
        self.file.first_number()
    }

    pub fn file_roll_limit(&self) -> Option<usize> {
        self.file.roll_limit()
    }

    pub fn set_log_file_basename(&mut self, basename: impl AsRef<std::path::Path>) -> Result<()> {
        self.file.set_basename(basename)
    }

    pub fn set_log_file_extension(&mut self, extension: &str) -> Result<()> {
        self.file.set_extension(extension)
    }

    /// Set basename and extension from a full path.
    pub fn set_log_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.file.set_full_path(path)
    }

    pub fn set_max_file_size_mb(&mut self, max_size_mb: Option<f64>) -> Result<()> {
        self.file.set_max_size_mb(max_size_mb)
    }

    pub fn set_first_file_number(&mut self, first_number: Option<u64>) -> Result<()> {
        self.file.set_first_number(first_number)
    }

    pub fn set_file_roll_limit(&mut self, roll_limit: Option<usize>) -> Result<()> {
        self.file.set_roll_limit(roll_limit)
    }

    // ---- type registry --------------------------------------------------

    pub fn is_log_type(&self, key: &str) -> bool {
        self.registry.is_defined(key)
    }

    pub fn log_type(&self, key: &str) -> Option<&LogType> {
        self.registry.get(key)
    }

    /// Registered keys ordered by level.
    pub fn log_type_keys(&self) -> Vec<&str> {
        self.registry.keys()
    }

    pub fn add_log_type(&mut self, key: &str, spec: LogTypeSpec) -> Result<()> {
        self.registry.add(key, spec)
    }

    pub fn update_log_type(&mut self, key: &str, patch: LogTypeSpec) -> Result<()> {
        self.registry.update(key, patch)
    }

    pub fn remove_log_type(&mut self, key: &str, assert_exists: bool) -> Result<()> {
        self.registry.remove(key, assert_exists)
    }

    pub fn set_minimum_level(&mut self, sink: Sink, level: Option<LevelSpec>) -> Result<()> {
        self.registry.set_minimum_level(sink, level)
    }

    pub fn set_maximum_level(&mut self, sink: Sink, level: Option<LevelSpec>) -> Result<()> {
        self.registry.set_maximum_level(sink, level)
    }

    pub fn minimum_level(&self, sink: Sink) -> Option<f64> {
        self.registry.minimum_level(sink)
    }

    pub fn maximum_level(&self, sink: Sink) -> Option<f64> {
        self.registry.maximum_level(sink)
    }

    /// Pin or release one type's flag for one sink.
    pub fn force_log_type_flag(
        &mut self,
        key: &str,
        sink: Sink,
        flag: Option<bool>,
    ) -> Result<()> {
        self.registry.force_flag(key, sink, flag)
    }

    /// Pin or release both of a type's flags; `None` releases.
    pub fn force_log_type_flags(
        &mut self,
        key: &str,
        stdout_flag: Option<bool>,
        file_flag: Option<bool>,
    ) -> Result<()> {
        self.registry.force_flag(key, Sink::Stdout, stdout_flag)?;
        self.registry.force_flag(key, Sink::File, file_flag)
    }

    /// Whether a `log` call with this type would reach the console.
    pub fn is_enabled_for_stdout(&self, key: &str) -> Result<bool> {
        let ty = self
            .registry
            .get(key)
            .ok_or_else(|| LoggerError::UnknownType(key.to_string()))?;
        Ok(self.log_to_stdout && ty.stdout_enabled())
    }

    /// Whether a `log` call with this type would reach the file.
    pub fn is_enabled_for_file(&self, key: &str) -> Result<bool> {
        let ty = self
            .registry
            .get(key)
            .ok_or_else(|| LoggerError::UnknownType(key.to_string()))?;
        Ok(self.log_to_file && ty.file_enabled())
    }

    // ---- last logged ----------------------------------------------------

    /// Last body logged with the given type.
    pub fn last_logged(&self, key: &str) -> Option<&str> {
        self.last_logged.get(key).map(String::as_str)
    }

    /// Last body logged with any type.
    pub fn last_logged_message(&self) -> Option<&str> {
        self.last_any.as_deref()
    }

    // ---- dispatch -------------------------------------------------------

    fn format_message(
        &self,
        ty: &LogType,
        message: &str,
        data: Option<&dyn fmt::Display>,
        traceback: Option<&Traceback>,
    ) -> String {
        let mut body = format!(
            "{} - {} <{}> {}",
            self.clock.now_string(),
            self.name,
            ty.name(),
            message
        );
        if let Some(footer) = &self.footer {
            body.push_str(&footer(ty, message));
        }
        if let Some(data) = data {
            body.push_str(&format!("\n{}", data));
        }
        if let Some(traceback) = traceback {
            body.push_str(&traceback.render());
        }
        body
    }

    fn dispatch(
        &mut self,
        key: &str,
        body: String,
        styled: String,
        to_stdout: bool,
        to_file: bool,
        flush: bool,
    ) -> Result<()> {
        if to_stdout {
            self.stdout.write_line(&format!("{}\n", styled));
            if flush {
                self.stdout.flush();
            }
        }
        if to_file {
            self.file.write(&format!("{}\n", body))?;
            if flush {
                self.file.sync();
            }
        }
        self.last_logged.insert(key.to_string(), body.clone());
        self.last_any = Some(body);
        Ok(())
    }

    /// Log a message with the given type.
    ///
    /// Delivery is gated per sink by the global flag and the type's resolved
    /// flag. Returns the original message.
    pub fn log<'m>(&mut self, log_type: &str, message: &'m str) -> Result<&'m str> {
        self.log_with(log_type, message, None, None)
    }

    /// Log a message with an optional data block and traceback.
    pub fn log_with<'m>(
        &mut self,
        log_type: &str,
        message: &'m str,
        data: Option<&dyn fmt::Display>,
        traceback: Option<&Traceback>,
    ) -> Result<&'m str> {
        let (body, styled, to_stdout, to_file) = {
            let ty = self
                .registry
                .get(log_type)
                .ok_or_else(|| LoggerError::UnknownType(log_type.to_string()))?;
            let body = self.format_message(ty, message, data, traceback);
            let styled = ty.style().wrap(&body);
            (
                body,
                styled,
                self.log_to_stdout && ty.stdout_enabled(),
                self.log_to_file && ty.file_enabled(),
            )
        };
        self.dispatch(log_type, body, styled, to_stdout, to_file, self.flush_on_write)?;
        Ok(message)
    }

    /// Log regardless of the global and per-type gates.
    ///
    /// Only the explicit `to_stdout`/`to_file` arguments decide delivery;
    /// streams are always flushed.
    pub fn force_log<'m>(
        &mut self,
        log_type: &str,
        message: &'m str,
        data: Option<&dyn fmt::Display>,
        traceback: Option<&Traceback>,
        to_stdout: bool,
        to_file: bool,
    ) -> Result<&'m str> {
        let (body, styled) = {
            let ty = self
                .registry
                .get(log_type)
                .ok_or_else(|| LoggerError::UnknownType(log_type.to_string()))?;
            let body = self.format_message(ty, message, data, traceback);
            let styled = ty.style().wrap(&body);
            (body, styled)
        };
        self.dispatch(log_type, body, styled, to_stdout, to_file, true)?;
        Ok(message)
    }

    pub fn debug<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("debug", message)
    }

    pub fn info<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("info", message)
    }

    pub fn warn<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("warn", message)
    }

    /// Alias of [`Logger::warn`].
    pub fn warning<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("warn", message)
    }

    pub fn error<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("error", message)
    }

    pub fn critical<'m>(&mut self, message: &'m str) -> Result<&'m str> {
        self.log("critical", message)
    }

    /// Flush both sinks, best-effort.
    pub fn flush(&mut self) {
        self.stdout.flush();
        self.file.sync();
    }

    /// Flush and close the file handle. It reopens lazily on the next write;
    /// dropping the logger closes it as well.
    pub fn close(&mut self) {
        self.stdout.flush();
        self.file.close();
    }

    /// Snapshot of the configuration, sufficient to build an equivalent
    /// logger (the console stream and footer hook are not serializable and
    /// must be re-supplied).
    pub fn options(&self) -> LoggerOptions {
        LoggerOptions {
            name: self.name.clone(),
            flush_on_write: self.flush_on_write,
            log_to_stdout: self.log_to_stdout,
            log_to_file: self.log_to_file,
            log_file: None,
            file_basename: self.file.basename().display().to_string(),
            file_extension: self.file.extension().to_string(),
            max_file_size_mb: self.file.max_size_mb(),
            first_file_number: self.file.first_number(),
            file_roll_limit: self.file.roll_limit(),
            stdout_min_level: self.registry.minimum_level(Sink::Stdout).map(LevelSpec::Value),
            stdout_max_level: self.registry.maximum_level(Sink::Stdout).map(LevelSpec::Value),
            file_min_level: self.registry.minimum_level(Sink::File).map(LevelSpec::Value),
            file_max_level: self.registry.maximum_level(Sink::File).map(LevelSpec::Value),
            initial_log_types: self.registry.snapshot(),
            timezone: self.clock.zone().map(String::from),
        }
    }
}

fn fmt_opt<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "unset".to_string(),
    }
}

impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Logger '{}'", self.name)?;
        writeln!(
            f,
            " - Log To Stdout: Flag ({}) - Min Level ({}) - Max Level ({})",
            self.log_to_stdout,
            fmt_opt(self.registry.minimum_level(Sink::Stdout)),
            fmt_opt(self.registry.maximum_level(Sink::Stdout)),
        )?;
        writeln!(
            f,
            " - Log To File:   Flag ({}) - Min Level ({}) - Max Level ({})",
            self.log_to_file,
            fmt_opt(self.registry.minimum_level(Sink::File)),
            fmt_opt(self.registry.maximum_level(Sink::File)),
        )?;
        writeln!(
            f,
            "                  File Size ({}) - First Number ({}) - Roll ({})",
            fmt_opt(self.file.max_size_mb()),
            fmt_opt(self.file.first_number()),
            fmt_opt(self.file.roll_limit()),
        )?;
        writeln!(
            f,
            "                  Current log file ({})",
            self.file.current_path().display()
        )?;
        let keys = self.registry.keys();
        let key_width = keys
            .iter()
            .map(|k| k.len() + 1)
            .chain([10])
            .max()
            .unwrap_or(10);
        let name_width = keys
            .iter()
            .filter_map(|k| self.registry.get(k))
            .map(|t| t.name().len() + 1)
            .chain([10])
            .max()
            .unwrap_or(10);
        writeln!(
            f,
            "{:<kw$}|{:<nw$}|{:<10}|{:<10}|{:<10}|",
            "log type",
            "log name",
            "level",
            "std flag",
            "file flag",
            kw = key_width,
            nw = name_width,
        )?;
        writeln!(
            f,
            "{}|{}|{}|{}|{}|",
            "-".repeat(key_width),
            "-".repeat(name_width),
            "-".repeat(10),
            "-".repeat(10),
            "-".repeat(10),
        )?;
        for key in keys {
            if let Some(ty) = self.registry.get(key) {
                writeln!(
                    f,
                    "{:<kw$}|{:<nw$}|{:<10}|{:<10}|{:<10}|",
                    key,
                    ty.name(),
                    ty.level(),
                    ty.stdout_enabled(),
                    ty.file_enabled(),
                    kw = key_width,
                    nw = name_width,
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("flush_on_write", &self.flush_on_write)
            .field("log_to_stdout", &self.log_to_stdout)
            .field("log_to_file", &self.log_to_file)
            .field("log_file", &self.file.current_path())
            .field("types", &self.registry.len())
            .finish()
    }
}
