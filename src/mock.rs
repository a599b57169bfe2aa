//! Recording transport for unit tests

extern crate std;

use core::cell::Cell;
use std::{
    sync::{Arc, Mutex},
    vec::Vec,
};

use embedded_hal::delay::DelayNs;

use crate::{
    completion::TransferSlot,
    sender::{
        expander::{BACKLIGHT, EN},
        Transport,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    /// address, byte, tagged with a slot
    Send(u8, u8, bool),
    /// address
    Receive(u8),
    /// microseconds slept by a [`LoggedDelay`]
    Delay(u32),
}

/// How tagged transfers finish
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Finish {
    Succeed,
    Fail,
    /// left in flight, the test finishes the slot itself
    Hold,
}

pub(crate) type Log = Arc<Mutex<Vec<Op>>>;

pub(crate) struct Recorder {
    log: Log,
    finish: Finish,
    /// outcomes used before falling back to `finish`
    scripted: Vec<Finish>,
    /// sends accepted before every further send is refused
    refuse_after: Option<usize>,
    sent: usize,
    reply: u8,
    full_for: Cell<u32>,
    full_polls: Cell<u32>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            finish: Finish::Succeed,
            scripted: Vec::new(),
            refuse_after: None,
            sent: 0,
            reply: 0x00,
            full_for: Cell::new(0),
            full_polls: Cell::new(0),
        }
    }

    pub(crate) fn finishing(finish: Finish) -> Self {
        let mut recorder = Self::new();
        recorder.finish = finish;
        recorder
    }

    /// outcomes for the next tagged transfers, in order
    pub(crate) fn script(&mut self, outcomes: &[Finish]) {
        self.scripted = outcomes.iter().rev().copied().collect();
    }

    pub(crate) fn reply_with(&mut self, byte: u8) {
        self.reply = byte;
    }

    pub(crate) fn refuse_after(&mut self, sends: usize) {
        self.refuse_after = Some(sends);
    }

    pub(crate) fn report_full(&mut self, times: u32) {
        self.full_for.set(times);
    }

    pub(crate) fn full_polls(&self) -> u32 {
        self.full_polls.get()
    }

    pub(crate) fn log(&self) -> Log {
        Arc::clone(&self.log)
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.log.lock().unwrap().clone()
    }

    /// A delay that logs into the same op stream
    pub(crate) fn delayer(&self) -> LoggedDelay {
        LoggedDelay(self.log())
    }

    fn finish_slot(&mut self, slot: &TransferSlot, read: bool) {
        let finish = self.scripted.pop().unwrap_or(self.finish);
        match finish {
            Finish::Succeed if read => slot.succeed_with(self.reply),
            Finish::Succeed => slot.succeed(),
            Finish::Fail => slot.fail(),
            Finish::Hold => {}
        }
    }
}

impl<'a> Transport<'a> for Recorder {
    type Error = ();

    fn is_full(&self) -> bool {
        self.full_polls.set(self.full_polls.get() + 1);
        match self.full_for.get() {
            0 => false,
            n => {
                self.full_for.set(n - 1);
                true
            }
        }
    }

    fn send_byte(
        &mut self,
        address: u8,
        value: u8,
        slot: Option<&'a TransferSlot>,
    ) -> Result<(), Self::Error> {
        if self.refuse_after.is_some_and(|limit| self.sent >= limit) {
            return Err(());
        }
        self.sent += 1;
        self.log
            .lock()
            .unwrap()
            .push(Op::Send(address, value, slot.is_some()));
        if let Some(slot) = slot {
            self.finish_slot(slot, false);
        }
        Ok(())
    }

    fn receive_byte(&mut self, address: u8, slot: &'a TransferSlot) -> Result<(), Self::Error> {
        self.log.lock().unwrap().push(Op::Receive(address));
        self.finish_slot(slot, true);
        Ok(())
    }
}

/// Delay that records every sleep as [`Op::Delay`]
pub(crate) struct LoggedDelay(Log);

impl DelayNs for LoggedDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.lock().unwrap().push(Op::Delay(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.lock().unwrap().push(Op::Delay(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.lock().unwrap().push(Op::Delay(ms.saturating_mul(1_000)));
    }
}

/// The four latch writes of one byte sent with backlight on, low nibble tagged
pub(crate) fn byte_ops(address: u8, rs: u8, byte: u8) -> [Op; 4] {
    let selector = (rs | BACKLIGHT) & 0x0F;
    let high = (byte & 0xF0) | selector;
    let low = ((byte << 4) & 0xF0) | selector;
    [
        Op::Send(address, high | EN, false),
        Op::Send(address, high, false),
        Op::Send(address, low | EN, false),
        Op::Send(address, low, true),
    ]
}

/// The two latch writes of an untracked init nibble
pub(crate) fn nibble_ops(address: u8, nibble: u8) -> [Op; 2] {
    [
        Op::Send(address, nibble | EN, false),
        Op::Send(address, nibble, false),
    ]
}
