//! HD44780 instruction set, and how each instruction maps to a byte

use crate::utils::{BitOps, BitState};

pub(crate) const CLEAR_DISPLAY: u8 = 0b0000_0001;
pub(crate) const RETURN_HOME: u8 = 0b0000_0010;
pub(crate) const ENTRY_MODE_SET: u8 = 0b0000_0100;
pub(crate) const DISPLAY_CONTROL: u8 = 0b0000_1000;
pub(crate) const CURSOR_SHIFT: u8 = 0b0001_0000;
pub(crate) const FUNCTION_SET: u8 = 0b0010_0000;
pub(crate) const SET_CGRAM_ADDR: u8 = 0b0100_0000;
pub(crate) const SET_DDRAM_ADDR: u8 = 0b1000_0000;

// entry mode flags
pub(crate) const ENTRY_LEFT_TO_RIGHT: u8 = 0b0000_0010;
pub(crate) const ENTRY_AUTOSCROLL: u8 = 0b0000_0001;

// display control flags
pub(crate) const DISPLAY_ON: u8 = 0b0000_0100;
pub(crate) const CURSOR_ON: u8 = 0b0000_0010;
pub(crate) const BLINK_ON: u8 = 0b0000_0001;

// cursor / display shift flags
pub(crate) const SHIFT_DISPLAY: u8 = 0b0000_1000;
pub(crate) const SHIFT_RIGHT: u8 = 0b0000_0100;

// function set flags
pub(crate) const MODE_8BIT: u8 = 0b0001_0000;
pub(crate) const TWO_LINE: u8 = 0b0000_1000;
pub(crate) const FONT_5X10: u8 = 0b0000_0100;

/// DDRAM start address of each row, rows beyond 1 only exist on 4 line modules
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Which register of the controller a byte goes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Instruction register, RS = 0
    Command = 0x00,
    /// Data register, RS = 1
    Data = 0x01,
}

/// Cursor or display movement direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveDirection {
    #[allow(missing_docs)]
    RightToLeft,
    #[allow(missing_docs)]
    #[default]
    LeftToRight,
}

/// What a shift instruction moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftType {
    /// Only the address counter moves
    #[default]
    CursorOnly,
    /// The whole display window moves, cursor follows
    CursorAndDisplay,
}

/// On / off switch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    #[allow(missing_docs)]
    Off,
    #[allow(missing_docs)]
    #[default]
    On,
}

impl From<State> for BitState {
    fn from(state: State) -> Self {
        match state {
            State::Off => BitState::Clear,
            State::On => BitState::Set,
        }
    }
}

/// Character font
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[allow(missing_docs)]
    #[default]
    Font5x8,
    /// Only usable with a single line
    Font5x10,
}

/// Every instruction this driver sends through the command register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandSet {
    /// Fill DDRAM with spaces, address counter back to 0
    ClearDisplay,
    /// Address counter and display shift back to 0
    ReturnHome,
    /// Raw entry mode parameters, see [`Registers`](crate::state::Registers)
    EntryModeSet(u8),
    /// Raw display control parameters
    DisplayControl(u8),
    /// Move cursor or the whole display by one
    CursorOrDisplayShift(ShiftType, MoveDirection),
    /// Raw function set parameters
    FunctionSet(u8),
    /// Set CGRAM address (6 bit)
    SetCGRAM(u8),
    /// Set DDRAM address (7 bit)
    SetDDRAM(u8),
}

impl From<CommandSet> for u8 {
    fn from(command: CommandSet) -> Self {
        match command {
            CommandSet::ClearDisplay => CLEAR_DISPLAY,

            CommandSet::ReturnHome => RETURN_HOME,

            CommandSet::EntryModeSet(params) => {
                ENTRY_MODE_SET | (params & (ENTRY_LEFT_TO_RIGHT | ENTRY_AUTOSCROLL))
            }

            CommandSet::DisplayControl(params) => {
                DISPLAY_CONTROL | (params & (DISPLAY_ON | CURSOR_ON | BLINK_ON))
            }

            CommandSet::CursorOrDisplayShift(st, dir) => {
                let mut raw_bits = CURSOR_SHIFT;

                match st {
                    ShiftType::CursorOnly => raw_bits.clear_mask(SHIFT_DISPLAY),
                    ShiftType::CursorAndDisplay => raw_bits.set_mask(SHIFT_DISPLAY),
                };

                match dir {
                    MoveDirection::RightToLeft => raw_bits.clear_mask(SHIFT_RIGHT),
                    MoveDirection::LeftToRight => raw_bits.set_mask(SHIFT_RIGHT),
                };

                raw_bits
            }

            CommandSet::FunctionSet(params) => {
                FUNCTION_SET | (params & (MODE_8BIT | TWO_LINE | FONT_5X10))
            }

            // CGRAM has 64 bytes, upper bits would turn this into a DDRAM address
            CommandSet::SetCGRAM(addr) => SET_CGRAM_ADDR | (addr & 0b0011_1111),

            CommandSet::SetDDRAM(addr) => SET_DDRAM_ADDR | (addr & 0b0111_1111),
        }
    }
}

/// DDRAM address of a cell
///
/// Rows are not checked against the configured row count,
/// a row past the table wraps onto it.
pub fn ddram_address(col: u8, row: u8) -> u8 {
    col.wrapping_add(ROW_OFFSETS[(row & 0b11) as usize])
}

/// CGRAM address of the first line of a custom glyph slot (0 ~ 7)
pub fn cgram_address(location: u8) -> u8 {
    (location & 0b111) << 3
}
