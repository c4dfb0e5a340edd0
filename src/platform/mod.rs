//! Platform abstraction traits.
//!
//! The interpreter never reads the system clock or writes to stdout directly;
//! the host hands it providers for those concerns.

mod std_impl;

use std::cell::Cell;

pub use std_impl::{StdConsoleProvider, StdTimeProvider};

/// Trait for providing the host clock.
///
/// The computation engine samples it after every successful bind step to
/// advance the context's logical clock.
pub trait TimeProvider {
    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> f64;
}

/// A manually driven clock for deterministic runs and tests.
pub struct FixedTimeProvider {
    now: Cell<f64>,
}

impl FixedTimeProvider {
    pub fn new(now: f64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: f64) {
        self.now.set(self.now.get() + millis);
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> f64 {
        self.now.get()
    }
}

/// Log level for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
}

/// Trait for handling `console.*` output.
pub trait ConsoleProvider {
    fn write(&self, level: ConsoleLevel, message: &str);
}

/// A console provider that discards all output.
pub struct NoOpConsoleProvider;

impl ConsoleProvider for NoOpConsoleProvider {
    fn write(&self, _level: ConsoleLevel, _message: &str) {}
}
