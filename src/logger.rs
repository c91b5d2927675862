//! Logging capability injected into the walker.
//!
//! The walker never reaches for a global logger. It is handed something that
//! implements [`Logger`] and reports every significant action through it.
//! Logging is fire-and-forget: nothing the logger does can change the walk.

use crate::output::OutputFormatter;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        })
    }
}

/// The three operations the walker needs from a logger.
pub trait Logger {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn error(&self, message: &str);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Writes log lines to the terminal with colored level prefixes.
///
/// Debug messages are suppressed unless `verbose` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger {
    pub verbose: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Logger for ConsoleLogger {
    fn info(&self, message: &str) {
        OutputFormatter::log_line(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            OutputFormatter::log_line(LogLevel::Debug, message);
        }
    }

    fn error(&self, message: &str) {
        OutputFormatter::log_line(LogLevel::Error, message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// A single captured log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every message in memory, in the order it was logged.
///
/// Useful for tests and for embedding the walker in a larger program.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.borrow_mut().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }

    /// Returns a copy of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    /// Returns the messages logged at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Returns true if any message at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_keeps_order_and_levels() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.debug("second");
        logger.error("third");

        let records = logger.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[1].message, "second");
        assert_eq!(logger.messages(LogLevel::Error), vec!["third".to_string()]);
        assert!(logger.contains(LogLevel::Debug, "sec"));
        assert!(!logger.contains(LogLevel::Info, "third"));
    }

    #[test]
    fn test_reference_and_box_forward() {
        let logger = MemoryLogger::new();
        {
            let by_ref: &dyn Logger = &logger;
            by_ref.info("via ref");
            let boxed: Box<dyn Logger + '_> = Box::new(&logger);
            boxed.error("via box");
        }
        assert_eq!(logger.records().len(), 2);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }
}
