use crate::{completion::TransferSlot, sender::Transport};

// PCF8574 to HD44780:
// P7 -> P0
// DB7/DB6/DB5/DB4/BL/EN/RW/RS

/// Register select, high for the data register
pub const RS: u8 = 0b0000_0001;
/// Read / write, high for read
pub const RW: u8 = 0b0000_0010;
/// Enable, the controller latches on its falling edge
pub const EN: u8 = 0b0000_0100;
/// Backlight transistor
pub const BACKLIGHT: u8 = 0b0000_1000;

/// Nibble transport over the expander latch
///
/// Every 4 bit chunk is written twice, once with EN set and once with EN cleared,
/// so the controller sees a full enable pulse.
pub struct Expander<T> {
    transport: T,
    address: u8,
}

impl<'a, T: Transport<'a>> Expander<T> {
    /// Wrap a transport, all latch writes go to the 7 bit `address`
    pub fn new(transport: T, address: u8) -> Self {
        Self { transport, address }
    }

    /// The 7 bit bus address of the expander
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.transport
    }

    /// Latch `byte` with an enable pulse
    ///
    /// Only the falling edge is tagged with `slot`, the rising edge is fire-and-forget.
    pub fn write_nibble(
        &mut self,
        byte: u8,
        slot: Option<&'a TransferSlot>,
    ) -> Result<(), T::Error> {
        self.push(byte | EN, None)?;
        self.push(byte & !EN, slot)
    }

    /// Put `byte` on the latch as is, without an enable pulse
    pub fn write_raw(&mut self, byte: u8) -> Result<(), T::Error> {
        self.push(byte, None)
    }

    /// Queue a read of the latch pins, finishing `slot` with the byte read
    pub fn read(&mut self, slot: &'a TransferSlot) -> Result<(), T::Error> {
        self.wait_for_room();
        self.transport.receive_byte(self.address, slot)
    }

    fn push(&mut self, byte: u8, slot: Option<&'a TransferSlot>) -> Result<(), T::Error> {
        self.wait_for_room();
        self.transport.send_byte(self.address, byte, slot)
    }

    fn wait_for_room(&self) {
        while self.transport.is_full() {
            core::hint::spin_loop();
        }
    }
}
