//! Standard library implementations of platform traits.

use std::time::{SystemTime, UNIX_EPOCH};

use super::{ConsoleLevel, ConsoleProvider, TimeProvider};

/// Time provider backed by the system clock.
#[derive(Default)]
pub struct StdTimeProvider;

impl StdTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for StdTimeProvider {
    fn now_millis(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

/// Console provider writing to stdout (log, info) and stderr (warn, error).
#[derive(Default)]
pub struct StdConsoleProvider;

impl StdConsoleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConsoleProvider for StdConsoleProvider {
    fn write(&self, level: ConsoleLevel, message: &str) {
        match level {
            ConsoleLevel::Log | ConsoleLevel::Info => println!("{message}"),
            ConsoleLevel::Warn | ConsoleLevel::Error => eprintln!("{message}"),
        }
    }
}
