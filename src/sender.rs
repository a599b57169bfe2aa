//! Bus side of the driver
//!
//! The display sits behind a queued I2C master, described by [`Transport`].
//! [`Expander`] turns display nibbles into PCF8574 latch writes on top of it.
//! If there is no interrupt driven I2C master at hand,
//! [`BlockingI2c`] adapts any [`embedded_hal::i2c::I2c`] bus.

use crate::completion::TransferSlot;

pub(crate) mod expander;
mod i2c_sender;

pub use expander::Expander;
pub use i2c_sender::BlockingI2c;

/// [`Transport`] is the trait a queued I2C master should implement to carry display traffic
///
/// A transfer tagged with a [`TransferSlot`] must finish it
/// (with [`TransferSlot::succeed`], [`TransferSlot::succeed_with`] or [`TransferSlot::fail`])
/// once the transfer is on the wire. Untagged transfers are fire-and-forget.
/// Transfers must reach the bus in the order they were queued.
pub trait Transport<'a> {
    /// Error returned when a transfer can't be queued
    type Error: core::fmt::Debug;

    /// `true` while the outbound queue can't take another transfer
    fn is_full(&self) -> bool;

    /// Queue a single byte write to `address`
    fn send_byte(
        &mut self,
        address: u8,
        value: u8,
        slot: Option<&'a TransferSlot>,
    ) -> Result<(), Self::Error>;

    /// Queue a single byte read from `address`, the byte goes to `slot`
    fn receive_byte(&mut self, address: u8, slot: &'a TransferSlot) -> Result<(), Self::Error>;
}

impl<'a, T: Transport<'a> + ?Sized> Transport<'a> for &mut T {
    type Error = T::Error;

    fn is_full(&self) -> bool {
        T::is_full(self)
    }

    fn send_byte(
        &mut self,
        address: u8,
        value: u8,
        slot: Option<&'a TransferSlot>,
    ) -> Result<(), Self::Error> {
        T::send_byte(self, address, value, slot)
    }

    fn receive_byte(&mut self, address: u8, slot: &'a TransferSlot) -> Result<(), Self::Error> {
        T::receive_byte(self, address, slot)
    }
}
