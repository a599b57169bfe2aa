use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::{completion::TransferSlot, sender::Transport};

/// [`Transport`] over a blocking [`I2c`] bus
///
/// Every transfer runs to completion inside the call, so the queue is never full
/// and a tagged slot is already finished when the call returns.
/// A failed tagged transfer is reported through its slot only;
/// a failed untagged transfer has no slot, so its error is returned.
pub struct BlockingI2c<I2cLcd: I2c<SevenBitAddress>> {
    i2c: I2cLcd,
}

impl<I2cLcd: I2c<SevenBitAddress>> BlockingI2c<I2cLcd> {
    #[allow(missing_docs)]
    pub fn new(i2c: I2cLcd) -> Self {
        Self { i2c }
    }

    /// Give the bus back
    pub fn release(self) -> I2cLcd {
        self.i2c
    }
}

impl<'a, I2cLcd: I2c<SevenBitAddress>> Transport<'a> for BlockingI2c<I2cLcd> {
    type Error = I2cLcd::Error;

    fn is_full(&self) -> bool {
        false
    }

    fn send_byte(
        &mut self,
        address: u8,
        value: u8,
        slot: Option<&'a TransferSlot>,
    ) -> Result<(), Self::Error> {
        let outcome = self.i2c.write(address, &[value]);

        match slot {
            Some(slot) => {
                slot.complete(&outcome);
                Ok(())
            }
            None => outcome,
        }
    }

    fn receive_byte(&mut self, address: u8, slot: &'a TransferSlot) -> Result<(), Self::Error> {
        let mut buf = [0u8];

        match self.i2c.read(address, &mut buf) {
            Ok(()) => slot.succeed_with(buf[0]),
            Err(_) => slot.fail(),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::completion::Status;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn tagged_write_finishes_slot() {
        let slot = TransferSlot::new();
        let expectations = [
            I2cTransaction::write(0x27, std::vec![0x0C]),
            I2cTransaction::write(0x27, std::vec![0x08]),
        ];
        let mut sender = BlockingI2c::new(I2cMock::new(&expectations));

        sender.send_byte(0x27, 0x0C, None).unwrap();
        slot.arm();
        sender.send_byte(0x27, 0x08, Some(&slot)).unwrap();

        assert_eq!(slot.status(), Status::Success);
        sender.release().done();
    }

    #[test]
    fn failed_tagged_write_marks_slot() {
        let slot = TransferSlot::new();
        let expectations =
            [I2cTransaction::write(0x27, std::vec![0x08]).with_error(ErrorKind::Other)];
        let mut sender = BlockingI2c::new(I2cMock::new(&expectations));

        slot.arm();
        assert!(sender.send_byte(0x27, 0x08, Some(&slot)).is_ok());

        assert_eq!(slot.status(), Status::Failure);
        sender.release().done();
    }

    #[test]
    fn failed_untagged_write_is_returned() {
        let expectations =
            [I2cTransaction::write(0x27, std::vec![0x08]).with_error(ErrorKind::Other)];
        let mut sender = BlockingI2c::new(I2cMock::new(&expectations));

        assert_eq!(sender.send_byte(0x27, 0x08, None), Err(ErrorKind::Other));
        sender.release().done();
    }

    #[test]
    fn read_lands_in_slot_buffer() {
        let slot = TransferSlot::new();
        let expectations = [I2cTransaction::read(0x27, std::vec![0x7A])];
        let mut sender = BlockingI2c::new(I2cMock::new(&expectations));

        slot.arm();
        sender.receive_byte(0x27, &slot).unwrap();

        assert_eq!(slot.status(), Status::Success);
        assert_eq!(slot.buffer(), 0x7A);
        sender.release().done();
    }
}
