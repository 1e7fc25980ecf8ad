//! Diagnostic logging for parameter lookups that miss everywhere.

use std::fmt;

use tracing::Level;

/// Sink for the diagnostic emitted when a lookup misses entirely.
///
/// Fire and forget: the bag sends one message naming the missing parameter,
/// then returns the error regardless.
pub trait ParameterLogger: Send + Sync + fmt::Debug {
    /// Records a single diagnostic message.
    fn log(&self, message: &str);
}

/// [`ParameterLogger`] forwarding diagnostics to the `tracing` ecosystem.
///
/// The level is configurable so deployments decide how loud a missing
/// runtime parameter should be. Defaults to `DEBUG`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    level: Level,
}

impl TracingLogger {
    /// Creates a logger emitting at the given level.
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl ParameterLogger for TracingLogger {
    fn log(&self, message: &str) {
        // Event macros want their level at compile time, so dispatch by hand.
        if self.level == Level::ERROR {
            tracing::error!("{}", message);
        } else if self.level == Level::WARN {
            tracing::warn!("{}", message);
        } else if self.level == Level::INFO {
            tracing::info!("{}", message);
        } else if self.level == Level::DEBUG {
            tracing::debug!("{}", message);
        } else {
            tracing::trace!("{}", message);
        }
    }
}
