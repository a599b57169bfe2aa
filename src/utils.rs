//! Common tools

/// The state of a bit,
/// It's either [`BitState::Clear`] to represent a 0
/// or [`BitState::Set`] to represent a 1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitState {
    /// Bit is 0
    Clear,
    /// Bit is 1
    Set,
}

/// Single bit ops on a register shadow
///
/// Every accumulator change in this crate goes through these methods,
/// so a toggle only ever touches the one bit it names.
pub trait BitOps {
    /// Set bits selected by `mask`
    fn set_mask(&mut self, mask: u8) -> Self;
    /// Clear bits selected by `mask`
    fn clear_mask(&mut self, mask: u8) -> Self;
    /// Set or clear bits selected by `mask`
    fn assign_mask(&mut self, mask: u8, state: BitState) -> Self;
    /// Read a single bit
    fn check_bit(&self, pos: u8) -> BitState;
}

impl BitOps for u8 {
    fn set_mask(&mut self, mask: u8) -> Self {
        *self |= mask;
        *self
    }

    fn clear_mask(&mut self, mask: u8) -> Self {
        *self &= !mask;
        *self
    }

    fn assign_mask(&mut self, mask: u8, state: BitState) -> Self {
        match state {
            BitState::Set => self.set_mask(mask),
            BitState::Clear => self.clear_mask(mask),
        }
    }

    fn check_bit(&self, pos: u8) -> BitState {
        debug_assert!(pos <= 7, "bit offset larger than 7");

        match (*self >> pos) & 1 {
            0 => BitState::Clear,
            _ => BitState::Set,
        }
    }
}
