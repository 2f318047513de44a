//! Digital I/O lines for push buttons and indicator LEDs.

use romi_types::RomiError;

/// A digital input line (e.g. a push button).
pub trait DigitalInput: Send + Sync {
    fn channel(&self) -> u32;

    /// Current level of the line (`true` = high / pressed).
    fn get(&self) -> bool;
}

/// A digital output line (e.g. an LED).
pub trait DigitalOutput: Send + Sync {
    fn channel(&self) -> u32;

    /// Drive the line to `value` (`true` = high / lit).
    ///
    /// # Errors
    ///
    /// Returns [`RomiError::HardwareFault`] if the line cannot be driven.
    fn set(&mut self, value: bool) -> Result<(), RomiError>;

    /// The level last written to the line.
    fn get(&self) -> bool;
}
