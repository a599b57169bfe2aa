//! Single slot completion cell shared between the driver and a bus transport
//!
//! The driver arms a [`TransferSlot`] right before it queues a tracked transfer,
//! the transport (usually from its interrupt handler) marks it finished.
//! Only one transfer per slot may be tracked at a time.

use core::sync::atomic::{AtomicU8, Ordering};

use embedded_hal::delay::DelayNs;

/// Probe buffer value meaning "nothing unread"
pub const EMPTY_BUFFER: u8 = 0xFF;

/// Progress of the last tracked transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Nothing tracked yet
    Idle = 0,
    /// Queued, not on the wire yet
    InFlight = 1,
    /// Transport reported success
    Success = 2,
    /// Transport reported failure
    Failure = 3,
}

impl Status {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Status::InFlight,
            2 => Status::Success,
            3 => Status::Failure,
            _ => Status::Idle,
        }
    }
}

/// The slot's wait gave up before the transfer finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaitTimeout;

/// Completion cell of one display
///
/// `const` constructible, so it can live in a `static` and be handed to an
/// interrupt driven transport:
///
/// ```
/// use pcf8574_hd44780::completion::{Status, TransferSlot};
///
/// static LCD_SLOT: TransferSlot = TransferSlot::new();
///
/// assert_eq!(LCD_SLOT.status(), Status::Idle);
/// ```
pub struct TransferSlot {
    status: AtomicU8,
    buffer: AtomicU8,
}

impl Default for TransferSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferSlot {
    /// An idle slot with an empty probe buffer
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Idle as u8),
            buffer: AtomicU8::new(EMPTY_BUFFER),
        }
    }

    /// Current status, never blocks
    pub fn status(&self) -> Status {
        Status::from_raw(self.status.load(Ordering::Acquire))
    }

    /// `true` while the tracked transfer is still queued
    pub fn is_pending(&self) -> bool {
        self.status() == Status::InFlight
    }

    /// Last byte stored by [`TransferSlot::succeed_with`]
    pub fn buffer(&self) -> u8 {
        self.buffer.load(Ordering::Acquire)
    }

    /// Transport side: the tracked write landed
    pub fn succeed(&self) {
        self.status.store(Status::Success as u8, Ordering::Release);
    }

    /// Transport side: the tracked read landed, with the byte it read
    pub fn succeed_with(&self, byte: u8) {
        // buffer first, a reader that sees Success must see the byte too
        self.buffer.store(byte, Ordering::Relaxed);
        self.status.store(Status::Success as u8, Ordering::Release);
    }

    /// Transport side: the tracked transfer failed (NACK, arbitration lost ...)
    pub fn fail(&self) {
        self.status.store(Status::Failure as u8, Ordering::Release);
    }

    /// Transport side: finish with the outcome of a blocking bus call
    pub fn complete<E>(&self, outcome: &Result<(), E>) {
        match outcome {
            Ok(()) => self.succeed(),
            Err(_) => self.fail(),
        }
    }

    pub(crate) fn arm(&self) {
        self.status.store(Status::InFlight as u8, Ordering::Release);
    }

    pub(crate) fn reset(&self) {
        self.status.store(Status::Idle as u8, Ordering::Release);
    }

    pub(crate) fn clear_buffer(&self) {
        self.buffer.store(EMPTY_BUFFER, Ordering::Release);
    }

    /// Wait in a busy loop, until the tracked transfer is no longer in flight
    ///
    /// With `poll_interval_us == 0` this spins with [`core::hint::spin_loop`],
    /// otherwise it sleeps on `delayer` between polls.
    /// `limit` bounds the number of polls, `None` waits forever:
    /// a transport that never completes will then hang the caller.
    pub fn wait<Delayer: DelayNs>(
        &self,
        delayer: &mut Delayer,
        poll_interval_us: u32,
        limit: Option<u32>,
    ) -> Result<Status, WaitTimeout> {
        let mut polls: u32 = 0;

        loop {
            let status = self.status();
            if status != Status::InFlight {
                return Ok(status);
            }

            if let Some(limit) = limit {
                if polls >= limit {
                    return Err(WaitTimeout);
                }
            }
            polls = polls.saturating_add(1);

            if poll_interval_us == 0 {
                core::hint::spin_loop();
            } else {
                delayer.delay_us(poll_interval_us);
            }
        }
    }
}
