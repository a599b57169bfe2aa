#![no_std]
#![no_main]

use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal::{
    i2c::{self, I2c},
    pac,
    prelude::*,
};

use pcf8574_hd44780::{
    command::State,
    completion::TransferSlot,
    lcd::{Config, Lcd},
    sender::BlockingI2c,
};

// a bold "U"
const U_CHAR: [u8; 8] = [
    0b11011, 0b11011, 0b11011, 0b11011, 0b11011, 0b11011, 0b11111, 0b01110,
];

static LCD_SLOT: TransferSlot = TransferSlot::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    rtt_init_print!();

    let dp = pac::Peripherals::take().expect("Cannot take device peripherals");
    let cp = pac::CorePeripherals::take().expect("Cannot take core peripherals");

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(12.MHz()).freeze();

    let delayer = cp.SYST.delay(&clocks);

    let gpiob = dp.GPIOB.split();

    let i2c = I2c::new(
        dp.I2C1,
        (gpiob.pb6, gpiob.pb7),
        i2c::Mode::standard(100.kHz()), // The PCF8574T max I2C speed
        &clocks,
    );

    // 20x4 module with a PCF8574A, A2/A1/A0 all high
    let mut lcd = Lcd::new(
        BlockingI2c::new(i2c),
        delayer,
        &LCD_SLOT,
        0x3F,
        Config::default().set_rows(4).set_poll_interval_us(10),
    );

    if let Err(e) = lcd.init() {
        rprintln!("LCD init failed: {:?}", e);
        panic!("no display");
    }
    rprintln!("LCD ready, registers: {:?}", lcd.get_registers());

    let result = (|| {
        lcd.print("Hi! This is a")?;
        lcd.move_cursor(0, 1)?;
        lcd.print("string!")?;

        // wait for the controller by polling its busy flag instead of a fixed delay
        lcd.request_busy_probe()?;
        while lcd.is_busy() {
            lcd.request_busy_probe()?;
        }

        lcd.create_char(1, &U_CHAR)?;
        // CGRAM writes leave the address counter in CGRAM
        lcd.move_cursor(0, 2)?;
        lcd.print("custom one: ")?;
        lcd.print_char(1)?;

        lcd.enable_cursor()?;
        lcd.enable_blink()?;

        lcd.move_cursor(8, 3)?;
        lcd.set_right_to_left()?;
        lcd.print("SDROWKCAB")?;
        lcd.set_left_to_right()?;

        for _ in 0..5 {
            lcd.scroll_left()?;
        }
        for _ in 0..5 {
            lcd.scroll_right()?;
        }

        lcd.disable_blink()?;
        lcd.disable_cursor()?;
        lcd.set_backlight(State::On)
    })();

    if let Err(e) = result {
        rprintln!("LCD error: {:?}", e);
    }

    #[allow(clippy::empty_loop)]
    loop {}
}
