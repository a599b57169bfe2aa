use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, Font, State},
    completion::TransferSlot,
    error::{FailurePolicy, LcdError},
    lcd::Lcd,
    sender::{Expander, Transport},
    state::Registers,
};

/// Wait after Vcc rises, datasheet asks for more than 40 ms
pub const POWER_ON_DELAY_US: u32 = 50_000;
/// Wait after the first and second 8 bit function set, at least 4.1 ms
pub const FORCE_8BIT_DELAY_US: u32 = 5_000;
/// Wait after the third 8 bit function set, at least 100 us
pub const FORCE_8BIT_RETRY_DELAY_US: u32 = 150;

// upper nibble of "function set, 8 bit", the controller may still be in 8 bit mode
const FORCE_8BIT_NIBBLE: u8 = 0x03 << 4;
// upper nibble of "function set, 4 bit"
const SELECT_4BIT_NIBBLE: u8 = 0x02 << 4;

/// [`Config`] is the init config of a [`Lcd`]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    rows: u8,
    font: Font,
    backlight: State,
    failure_policy: FailurePolicy,
    poll_interval_us: u32,
    wait_limit: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 2,
            font: Font::default(),
            backlight: State::On,
            failure_policy: FailurePolicy::default(),
            poll_interval_us: 0,
            wait_limit: None,
        }
    }
}

#[allow(missing_docs)]
impl Config {
    pub fn get_rows(&self) -> u8 {
        self.rows
    }

    /// Number of rows of the module, 1 selects one line mode
    pub fn set_rows(mut self, rows: u8) -> Self {
        self.rows = rows;
        self
    }

    pub fn get_font(&self) -> Font {
        self.font
    }

    /// 5x10 only takes effect on one line modules
    pub fn set_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn get_backlight(&self) -> State {
        self.backlight
    }

    pub fn set_backlight(mut self, backlight: State) -> Self {
        self.backlight = backlight;
        self
    }

    pub fn get_failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn set_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn get_poll_interval_us(&self) -> u32 {
        self.poll_interval_us
    }

    /// While a transfer is in flight, wait this long between two polls,
    /// 0 polls in a tight loop
    pub fn set_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.poll_interval_us = interval_us;
        self
    }

    pub fn get_wait_limit(&self) -> Option<u32> {
        self.wait_limit
    }

    /// Give up waiting on an in flight transfer after this many polls,
    /// `None` waits forever
    ///
    /// With `None`, a transport that never finishes the slot hangs every later call.
    pub fn set_wait_limit(mut self, polls: Option<u32>) -> Self {
        self.wait_limit = polls;
        self
    }
}

impl<'a, T, Delayer> Lcd<'a, T, Delayer>
where
    T: Transport<'a>,
    Delayer: DelayNs,
{
    /// Create a [`Lcd`] driver, nothing is sent yet
    ///
    /// `slot` tracks this display's transfers and must not be shared with another display,
    /// a `static` [`TransferSlot`] per display is the usual setup.
    pub fn new(
        transport: T,
        delayer: Delayer,
        slot: &'a TransferSlot,
        address: u8,
        config: Config,
    ) -> Self {
        Self {
            bus: Expander::new(transport, address),
            delayer,
            slot,
            backlight: config.get_backlight(),
            config,
            registers: Registers::default(),
            last_write: None,
        }
    }

    /// Init LCD hardware into 4 bit mode, clear it, and turn it on
    ///
    /// Must run once, after the I2C bus is up.
    /// The sequence forces the controller into 8 bit mode first,
    /// whatever state it powered up in, then switches to 4 bit mode.
    pub fn init(&mut self) -> Result<(), LcdError<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd {=u8:#x}: init, {=u8} rows", self.bus.address(), self.config.get_rows());

        self.delayer.delay_us(POWER_ON_DELAY_US);

        // in initialization process, we'd better use "raw nibble", to strictly follow datasheet
        self.bus.write_nibble(FORCE_8BIT_NIBBLE, None)?;
        self.delayer.delay_us(FORCE_8BIT_DELAY_US);

        self.bus.write_nibble(FORCE_8BIT_NIBBLE, None)?;
        self.delayer.delay_us(FORCE_8BIT_DELAY_US);

        self.bus.write_nibble(FORCE_8BIT_NIBBLE, None)?;
        self.delayer.delay_us(FORCE_8BIT_RETRY_DELAY_US);

        self.bus.write_nibble(SELECT_4BIT_NIBBLE, None)?;

        // from here on every byte is sent as 2 nibbles
        let function = self
            .registers
            .setup_function(self.config.get_rows(), self.config.get_font());
        self.command(CommandSet::FunctionSet(function))?;

        let control = self.registers.reset_control();
        self.command(CommandSet::DisplayControl(control))?;

        self.clear(true)?;

        let entry = self.registers.reset_entry();
        self.command(CommandSet::EntryModeSet(entry))?;

        self.on()
    }
}
