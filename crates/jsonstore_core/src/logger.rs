//! Injectable logging sink used by the driver.
//!
//! # Responsibility
//! - Define the leveled logger contract the driver reports through.
//! - Provide a stderr console sink (default) and a `log` facade sink.
//!
//! # Invariants
//! - Sinks are observability only; no driver decision depends on them.

use std::fmt::{self, Arguments, Display, Formatter};
use std::io::Write;

/// Severity accepted by [`Logger`], most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Fatal | LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Leveled logging sink.
///
/// Implementors only provide [`Logger::log`]; the per-level helpers forward
/// to it. Sinks must be shareable because one driver serves many threads.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    fn fatal(&self, args: Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }
}

impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        (**self).log(level, args);
    }
}

/// Writes `LEVEL message` lines to stderr at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLogger {
    threshold: LogLevel,
}

impl ConsoleLogger {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Whether a record at `level` passes the threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.threshold
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        // Lock once so concurrent records do not interleave mid-line.
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{level:<5} {args}");
    }
}

/// Forwards records to the `log` crate under the `jsonstore` target.
///
/// Pair with [`crate::logging::init_logging`] or
/// [`crate::logging::init_console_logging`] to route driver events into
/// the process logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if level == LogLevel::Fatal {
            log::error!(target: "jsonstore", "fatal: {args}");
        } else {
            log::log!(target: "jsonstore", log::Level::from(level), "{args}");
        }
    }
}
