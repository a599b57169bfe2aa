//! Busy flag polling without stalling the caller
//!
//! [`Lcd::request_busy_probe()`] queues a status read, [`Lcd::is_busy()`] looks at its result later.
//! A cooperative scheduler can run other work in between instead of sitting in a fixed delay.

use embedded_hal::delay::DelayNs;

use crate::{
    completion::Status,
    error::LcdError,
    lcd::Lcd,
    sender::{
        expander::{EN, RW},
        Transport,
    },
    utils::{BitOps, BitState},
};

impl<'a, T, Delayer> Lcd<'a, T, Delayer>
where
    T: Transport<'a>,
    Delayer: DelayNs,
{
    /// Queue a busy flag read
    ///
    /// Does nothing if a command or an earlier probe is still in flight.
    /// In 4 bit mode a status read takes 2 enable pulses,
    /// only the first one (DB7 ~ DB4, busy flag on DB7) is sampled.
    pub fn request_busy_probe(&mut self) -> Result<(), LcdError<T::Error>> {
        if self.slot.is_pending() {
            return Ok(());
        }

        // data pins high, so PCF8574 weak pull ups let the controller drive them
        let latch = 0xF0 | RW | self.backlight_bit();

        self.bus.write_raw(latch)?;
        self.bus.write_raw(latch | EN)?;

        self.slot.clear_buffer();
        self.slot.arm();
        // a probe is never replayed by the retry policy
        self.last_write = None;
        if let Err(e) = self.bus.read(self.slot) {
            self.slot.reset();
            return Err(LcdError::Bus(e));
        }

        self.bus.write_raw(latch)?;

        // low nibble, pulsed and dropped
        self.bus.write_raw(latch | EN)?;
        self.bus.write_raw(latch)?;

        Ok(())
    }

    /// Result of the last probe
    ///
    /// Only a successful read with a cleared busy flag counts as ready,
    /// that result is consumed, so the next call reads busy again until a new probe lands.
    pub fn is_busy(&mut self) -> bool {
        if self.slot.status() != Status::Success {
            return true;
        }

        match self.slot.buffer().check_bit(7) {
            BitState::Set => true,
            BitState::Clear => {
                self.slot.clear_buffer();
                false
            }
        }
    }

    /// Probe until the controller reports ready
    ///
    /// Sleeps the configured poll interval between probes,
    /// and gives up after the configured wait limit of probes.
    pub fn wait_ready(&mut self) -> Result<(), LcdError<T::Error>> {
        let limit = self.config.get_wait_limit();
        let mut probes: u32 = 0;

        loop {
            self.request_busy_probe()?;
            self.wait_slot()?;
            if !self.is_busy() {
                return Ok(());
            }

            if let Some(limit) = limit {
                if probes >= limit {
                    return Err(LcdError::Timeout);
                }
            }
            probes = probes.saturating_add(1);

            self.delayer.delay_us(self.config.get_poll_interval_us());
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::delay::NoopDelay;

    use super::*;
    use crate::{
        completion::{TransferSlot, EMPTY_BUFFER},
        lcd::Config,
        mock::{Finish, Op, Recorder},
    };

    const ADDR: u8 = 0x27;

    #[test]
    fn probe_is_two_pulses_and_one_read() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::finishing(Finish::Hold);
        let log = recorder.log();
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.request_busy_probe().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            [
                Op::Send(ADDR, 0xFA, false),
                Op::Send(ADDR, 0xFE, false),
                Op::Receive(ADDR),
                Op::Send(ADDR, 0xFA, false),
                Op::Send(ADDR, 0xFE, false),
                Op::Send(ADDR, 0xFA, false),
            ]
        );
        assert!(slot.is_pending());
        assert!(lcd.is_busy());
    }

    #[test]
    fn probe_while_in_flight_is_a_no_op() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::finishing(Finish::Hold);
        let log = recorder.log();
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.print_char(b'x').unwrap();
        log.lock().unwrap().clear();

        lcd.request_busy_probe().unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn ready_result_is_consumed_once() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::new();
        recorder.reply_with(0x3A);
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.request_busy_probe().unwrap();

        assert!(!lcd.is_busy());
        assert_eq!(slot.buffer(), EMPTY_BUFFER);
        assert!(lcd.is_busy());
    }

    #[test]
    fn busy_flag_set_reads_busy() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::new();
        recorder.reply_with(0xBA);
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.request_busy_probe().unwrap();

        assert!(lcd.is_busy());
        assert_eq!(slot.buffer(), 0xBA);
    }

    #[test]
    fn failed_read_is_never_ready() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::finishing(Finish::Fail);
        recorder.reply_with(0x00);
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.request_busy_probe().unwrap();

        assert!(lcd.is_busy());
    }

    #[test]
    fn wait_ready_returns_on_first_ready_probe() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::new();
        recorder.reply_with(0x05);
        let log = recorder.log();
        let mut lcd = Lcd::new(&mut recorder, NoopDelay, &slot, ADDR, Config::default());

        lcd.wait_ready().unwrap();

        let receives = log
            .lock()
            .unwrap()
            .iter()
            .filter(|op| matches!(op, Op::Receive(_)))
            .count();
        assert_eq!(receives, 1);
    }

    #[test]
    fn wait_ready_gives_up_after_limit() {
        let slot = TransferSlot::new();
        let mut recorder = Recorder::new();
        recorder.reply_with(0xFF);
        let log = recorder.log();
        let mut lcd = Lcd::new(
            &mut recorder,
            NoopDelay,
            &slot,
            ADDR,
            Config::default().set_wait_limit(Some(2)),
        );

        assert_eq!(lcd.wait_ready(), Err(LcdError::Timeout));

        let receives = log
            .lock()
            .unwrap()
            .iter()
            .filter(|op| matches!(op, Op::Receive(_)))
            .count();
        assert_eq!(receives, 3);
    }
}
