//! Shadow copies of the controller registers

use crate::{
    command::{
        Font, State, BLINK_ON, CURSOR_ON, DISPLAY_ON, ENTRY_AUTOSCROLL, ENTRY_LEFT_TO_RIGHT,
        FONT_5X10, TWO_LINE,
    },
    utils::{BitOps, BitState},
};

/// Host side copy of the write-only controller registers
///
/// HD44780 can't report display / cursor / entry settings back,
/// so every change is made here first, by flipping one bit of the current value,
/// then the whole register is sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Registers {
    function: u8,
    control: u8,
    entry: u8,
}

impl Registers {
    /// Function set parameters (bus width, lines, font)
    pub fn function(&self) -> u8 {
        self.function
    }

    /// Display control parameters (display, cursor, blink)
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Entry mode parameters (direction, autoscroll)
    pub fn entry(&self) -> u8 {
        self.entry
    }

    // 4 bit bus is implied by a cleared bit 4
    pub(crate) fn setup_function(&mut self, rows: u8, font: Font) -> u8 {
        self.function = 0;
        if rows > 1 {
            self.function.set_mask(TWO_LINE);
        }
        if font == Font::Font5x10 {
            self.function.set_mask(FONT_5X10);
        }
        self.function
    }

    pub(crate) fn reset_control(&mut self) -> u8 {
        self.control = 0;
        self.control
    }

    pub(crate) fn reset_entry(&mut self) -> u8 {
        self.entry = ENTRY_LEFT_TO_RIGHT;
        self.entry
    }

    pub(crate) fn set_display(&mut self, state: State) -> u8 {
        self.control.assign_mask(DISPLAY_ON, state.into())
    }

    pub(crate) fn set_cursor(&mut self, state: State) -> u8 {
        self.control.assign_mask(CURSOR_ON, state.into())
    }

    pub(crate) fn set_blink(&mut self, state: State) -> u8 {
        self.control.assign_mask(BLINK_ON, state.into())
    }

    pub(crate) fn set_left_to_right(&mut self, state: State) -> u8 {
        self.entry.assign_mask(ENTRY_LEFT_TO_RIGHT, state.into())
    }

    pub(crate) fn set_autoscroll(&mut self, state: State) -> u8 {
        self.entry.assign_mask(ENTRY_AUTOSCROLL, state.into())
    }

    /// Whether the display is currently switched on
    pub fn display_state(&self) -> State {
        Self::state_of(self.control, 2)
    }

    /// Whether the cursor underline is visible
    pub fn cursor_state(&self) -> State {
        Self::state_of(self.control, 1)
    }

    /// Whether the cursor block blinks
    pub fn blink_state(&self) -> State {
        Self::state_of(self.control, 0)
    }

    /// Whether autoscroll is enabled
    pub fn autoscroll_state(&self) -> State {
        Self::state_of(self.entry, 0)
    }

    fn state_of(reg: u8, pos: u8) -> State {
        match reg.check_bit(pos) {
            BitState::Set => State::On,
            BitState::Clear => State::Off,
        }
    }
}
