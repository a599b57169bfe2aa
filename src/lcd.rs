//! The display handle and every operation it offers

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::{
    command::{
        cgram_address, ddram_address, CommandSet, Mode, MoveDirection, ShiftType, State,
        CLEAR_DISPLAY, RETURN_HOME,
    },
    completion::{Status, TransferSlot},
    error::{FailurePolicy, LcdError},
    sender::{
        expander::{BACKLIGHT, RS},
        Expander, Transport,
    },
    state::Registers,
};

mod busy;
mod init;

pub use init::{
    Config, FORCE_8BIT_DELAY_US, FORCE_8BIT_RETRY_DELAY_US, POWER_ON_DELAY_US,
};

/// Settle time of clear display, the controller ignores everything meanwhile
pub const CLEAR_DELAY_US: u32 = 2_000;
/// Settle time of return home
pub const RETURN_HOME_DELAY_US: u32 = 2_000;

/// A HD44780 display behind a PCF8574 expander
///
/// Build it with [`Lcd::new()`], then call [`Lcd::init()`] once.
///
/// Each byte goes out as two enable-framed nibbles, the falling edge of the low nibble
/// is tracked by the display's [`TransferSlot`]. A new byte is only queued
/// after the previous tracked transfer left the bus, so there is never more than
/// one tracked transfer in flight per display.
pub struct Lcd<'a, T: Transport<'a>, Delayer: DelayNs> {
    bus: Expander<T>,
    delayer: Delayer,
    slot: &'a TransferSlot,
    config: Config,
    registers: Registers,
    backlight: State,
    last_write: Option<(Mode, u8)>,
}

impl<'a, T: Transport<'a>, Delayer: DelayNs> Lcd<'a, T, Delayer> {
    /// Clear display, and set address counter to 0
    ///
    /// With `blocking`, wait until the command is on the bus and the controller settled,
    /// a failed transfer is handled by the [`FailurePolicy`] right here.
    pub fn clear(&mut self, blocking: bool) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::ClearDisplay)?;
        if blocking {
            self.finish_blocking()?;
        }
        Ok(())
    }

    /// Move cursor and display window back to address 0
    ///
    /// With `blocking`, wait until the command is on the bus and the controller settled,
    /// a failed transfer is handled by the [`FailurePolicy`] right here.
    pub fn return_home(&mut self, blocking: bool) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::ReturnHome)?;
        if blocking {
            self.finish_blocking()?;
        }
        Ok(())
    }

    /// Turn display on, DDRAM content is kept while off
    pub fn on(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_display(State::On);
        self.command(CommandSet::DisplayControl(params))
    }

    /// Turn display off
    pub fn off(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_display(State::Off);
        self.command(CommandSet::DisplayControl(params))
    }

    #[allow(missing_docs)]
    pub fn enable_cursor(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_cursor(State::On);
        self.command(CommandSet::DisplayControl(params))
    }

    #[allow(missing_docs)]
    pub fn disable_cursor(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_cursor(State::Off);
        self.command(CommandSet::DisplayControl(params))
    }

    #[allow(missing_docs)]
    pub fn enable_blink(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_blink(State::On);
        self.command(CommandSet::DisplayControl(params))
    }

    #[allow(missing_docs)]
    pub fn disable_blink(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_blink(State::Off);
        self.command(CommandSet::DisplayControl(params))
    }

    /// Shift the whole display one cell to the left
    pub fn scroll_left(&mut self) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::CursorOrDisplayShift(
            ShiftType::CursorAndDisplay,
            MoveDirection::RightToLeft,
        ))
    }

    /// Shift the whole display one cell to the right
    pub fn scroll_right(&mut self) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::CursorOrDisplayShift(
            ShiftType::CursorAndDisplay,
            MoveDirection::LeftToRight,
        ))
    }

    /// Move only the cursor by one cell, display stays
    pub fn shift_cursor(&mut self, dir: MoveDirection) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::CursorOrDisplayShift(ShiftType::CursorOnly, dir))
    }

    /// Cursor moves right after each written character
    pub fn set_left_to_right(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_left_to_right(State::On);
        self.command(CommandSet::EntryModeSet(params))
    }

    /// Cursor moves left after each written character
    pub fn set_right_to_left(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_left_to_right(State::Off);
        self.command(CommandSet::EntryModeSet(params))
    }

    /// Shift the display instead of the cursor on each written character
    pub fn enable_autoscroll(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_autoscroll(State::On);
        self.command(CommandSet::EntryModeSet(params))
    }

    #[allow(missing_docs)]
    pub fn disable_autoscroll(&mut self) -> Result<(), LcdError<T::Error>> {
        let params = self.registers.set_autoscroll(State::Off);
        self.command(CommandSet::EntryModeSet(params))
    }

    /// Store a 5x8 glyph in CGRAM slot `location` (0 ~ 7, higher values wrap)
    ///
    /// Afterwards the address counter points into CGRAM,
    /// call [`Lcd::move_cursor()`] or [`Lcd::return_home()`] before printing again.
    /// Nothing else may be sent to this display until this returns.
    pub fn create_char(&mut self, location: u8, glyph: &[u8; 8]) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::SetCGRAM(cgram_address(location)))?;
        glyph
            .iter()
            .try_for_each(|&line| self.send(Mode::Data, line))
    }

    /// Move cursor to (`col`, `row`)
    ///
    /// `row` is not checked against the configured row count.
    pub fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), LcdError<T::Error>> {
        self.command(CommandSet::SetDDRAM(ddram_address(col, row)))
    }

    /// Write one byte to DDRAM at the cursor, 0 ~ 7 show custom glyphs
    pub fn print_char(&mut self, ch: u8) -> Result<(), LcdError<T::Error>> {
        self.send(Mode::Data, ch)
    }

    /// Write every byte of `text` from the cursor on
    ///
    /// Blocks whenever the transport queue is full.
    pub fn print(&mut self, text: &str) -> Result<(), LcdError<T::Error>> {
        text.bytes().try_for_each(|byte| self.print_char(byte))
    }

    /// Switch the backlight, the latch is updated right away
    pub fn set_backlight(&mut self, backlight: State) -> Result<(), LcdError<T::Error>> {
        self.backlight = backlight;
        self.bus.write_raw(self.backlight_bit())?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn get_backlight(&self) -> State {
        self.backlight
    }

    /// Shadow copies of the write-only registers
    pub fn get_registers(&self) -> Registers {
        self.registers
    }

    #[allow(missing_docs)]
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    /// 7 bit bus address of the expander
    pub fn get_address(&self) -> u8 {
        self.bus.address()
    }

    #[allow(missing_docs)]
    pub fn get_rows(&self) -> u8 {
        self.config.get_rows()
    }

    /// The completion cell this display tracks its transfers with
    pub fn get_slot(&self) -> &'a TransferSlot {
        self.slot
    }

    /// Give the transport and the delay provider back
    pub fn release(self) -> (T, Delayer) {
        (self.bus.release(), self.delayer)
    }

    /// Send a byte to the instruction or data register
    ///
    /// Waits for the previous tracked transfer, handles its failure by the
    /// configured [`FailurePolicy`], then queues high nibble and low nibble.
    pub fn send(&mut self, mode: Mode, byte: u8) -> Result<(), LcdError<T::Error>> {
        self.settle()?;
        self.write_byte(mode, byte)
    }

    fn command(&mut self, command: CommandSet) -> Result<(), LcdError<T::Error>> {
        self.send(Mode::Command, command.into())
    }

    fn backlight_bit(&self) -> u8 {
        match self.backlight {
            State::On => BACKLIGHT,
            State::Off => 0,
        }
    }

    fn selector(&self, mode: Mode) -> u8 {
        let rs = match mode {
            Mode::Command => 0,
            Mode::Data => RS,
        };
        (rs | self.backlight_bit()) & 0x0F
    }

    fn write_byte(&mut self, mode: Mode, byte: u8) -> Result<(), LcdError<T::Error>> {
        let selector = self.selector(mode);

        #[cfg(feature = "defmt")]
        defmt::trace!("lcd {=u8:#x}: {} {=u8:#x}", self.bus.address(), mode, byte);

        self.bus.write_nibble((byte & 0xF0) | selector, None)?;

        // a write makes any earlier probe result stale
        self.slot.clear_buffer();
        self.slot.arm();
        self.last_write = Some((mode, byte));
        if let Err(e) = self
            .bus
            .write_nibble(((byte << 4) & 0xF0) | selector, Some(self.slot))
        {
            // nothing will ever finish the slot
            self.slot.reset();
            return Err(LcdError::Bus(e));
        }
        Ok(())
    }

    fn wait_slot(&mut self) -> Result<Status, LcdError<T::Error>> {
        self.slot
            .wait(
                &mut self.delayer,
                self.config.get_poll_interval_us(),
                self.config.get_wait_limit(),
            )
            .map_err(LcdError::timeout)
    }

    fn settle(&mut self) -> Result<(), LcdError<T::Error>> {
        if self.wait_slot()? == Status::Failure && self.recover()? {
            // a resent clear or home needs its settle time before the next byte
            self.command_delay();
        }
        Ok(())
    }

    // wait for the command just sent, then give the controller its execution time
    fn finish_blocking(&mut self) -> Result<(), LcdError<T::Error>> {
        if self.wait_slot()? == Status::Failure {
            self.recover()?;
        }
        self.command_delay();
        Ok(())
    }

    /// Apply the failure policy to a failed tracked transfer,
    /// `Ok(true)` when the failed byte went out again successfully
    fn recover(&mut self) -> Result<bool, LcdError<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "lcd {=u8:#x}: last transfer failed, policy {}",
            self.bus.address(),
            self.config.get_failure_policy()
        );

        match self.config.get_failure_policy() {
            // the failed state stays visible through the slot until the next write
            FailurePolicy::Ignore => Ok(false),

            FailurePolicy::Report => {
                self.slot.reset();
                self.last_write = None;
                Err(LcdError::TransferFailed)
            }

            FailurePolicy::Retry => {
                self.slot.reset();
                let Some((mode, byte)) = self.last_write.take() else {
                    return Ok(false);
                };

                self.write_byte(mode, byte)?;
                if self.wait_slot()? == Status::Failure {
                    self.slot.reset();
                    self.last_write = None;
                    return Err(LcdError::TransferFailed);
                }
                Ok(true)
            }
        }
    }

    fn command_delay(&mut self) {
        match self.last_write {
            Some((Mode::Command, CLEAR_DISPLAY)) => self.delayer.delay_us(CLEAR_DELAY_US),
            Some((Mode::Command, RETURN_HOME)) => self.delayer.delay_us(RETURN_HOME_DELAY_US),
            _ => {}
        }
    }
}

impl<'a, T: Transport<'a>, Delayer: DelayNs> fmt::Write for Lcd<'a, T, Delayer> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}
