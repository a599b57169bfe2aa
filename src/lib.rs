/*!
# PCF8574 HD44780 Driver

Drives a HD44780 character LCD in 4 bit mode, through a PCF8574 I2C expander,
on top of a queued, interrupt completed I2C master.

Basic Usage:

1. Provide a "transport" <br/>
    Implement [`sender::Transport`] for your queued I2C master,
    or wrap any blocking [`embedded_hal::i2c::I2c`] bus in [`sender::BlockingI2c`].
<br/>
<br/>
2. Give every display a [`completion::TransferSlot`] <br/>
    Usually a `static`, the transport finishes it from its interrupt handler.
<br/>
<br/>
3. Use [`lcd::Lcd::new()`] to create a [`lcd::Lcd`], then [`lcd::Lcd::init()`] to initialize LCD hardware
<br/>
<br/>
4. use any methods provide by [`lcd::Lcd`] to control the display,
    or [`lcd::Lcd::request_busy_probe()`] / [`lcd::Lcd::is_busy()`] to poll it without blocking

```
use embedded_hal_mock::eh1::{delay::NoopDelay, i2c::Mock as I2cMock};
use pcf8574_hd44780::{completion::TransferSlot, lcd::{Config, Lcd}, sender::BlockingI2c};

static SLOT: TransferSlot = TransferSlot::new();

let mut i2c = I2cMock::new(&[]);
let lcd = Lcd::new(
    BlockingI2c::new(i2c.clone()),
    NoopDelay,
    &SLOT,
    0x27,
    Config::default().set_rows(4),
);
assert_eq!(lcd.get_rows(), 4);
i2c.done();
```
*/

#![no_std]
#![warn(missing_docs)]

pub mod command;
pub mod completion;
pub mod error;
pub mod lcd;
pub mod sender;
pub mod state;
pub mod utils;

#[cfg(test)]
mod mock;
