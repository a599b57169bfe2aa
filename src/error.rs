//! Error types for the display driver.

use core::fmt;

use crate::completion::WaitTimeout;

/// What to do when the previous tracked transfer finished with a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailurePolicy {
    /// Treat the failure like a completed transfer and go on
    #[default]
    Ignore,
    /// Return [`LcdError::TransferFailed`] from the next operation, without sending
    Report,
    /// Send the failed byte once more, report if it fails again
    Retry,
}

/// Errors that can occur when talking to the display.
#[derive(Debug, PartialEq, Eq)]
pub enum LcdError<E> {
    /// The transport refused to queue a transfer.
    Bus(E),

    /// A tracked transfer completed with a failure.
    TransferFailed,

    /// The tracked transfer was still in flight after the configured number of polls.
    Timeout,
}

// Allow ergonomic `?` propagation from raw transport errors.
impl<E> From<E> for LcdError<E> {
    fn from(error: E) -> Self {
        LcdError::Bus(error)
    }
}

impl<E> LcdError<E> {
    pub(crate) fn timeout(_: WaitTimeout) -> Self {
        LcdError::Timeout
    }
}

impl<E: fmt::Debug> fmt::Display for LcdError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LcdError::Bus(e) => write!(f, "I2C transport error: {:?}", e),
            LcdError::TransferFailed => write!(f, "I2C transfer to the expander failed"),
            LcdError::Timeout => write!(f, "I2C transfer did not complete in time"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for LcdError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LcdError::Bus(e) => defmt::write!(f, "I2C transport error: {}", e),
            LcdError::TransferFailed => defmt::write!(f, "I2C transfer failed"),
            LcdError::Timeout => defmt::write!(f, "I2C transfer timed out"),
        }
    }
}
