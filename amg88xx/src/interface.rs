// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The transport between the driver and the sensor.
//!
//! The driver never talks to a bus directly, it goes through an [`Interface`]. Most users will
//! want [`I2cInterface`], which works with any [`embedded-hal`][embedded-hal] blocking I²C
//! implementation.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/0.2/embedded_hal/blocking/i2c/index.html
use arrayvec::ArrayVec;
use embedded_hal::blocking::i2c;

/// The most bytes of register data sent in a single I²C write.
///
/// Longer writes are split up, relying on the sensor incrementing the register address.
pub const MAX_WRITE_LENGTH: usize = 16;

/// Register-addressed access to the sensor.
pub trait Interface {
    type Error;

    /// Prepare the transport for use. Called once at the start of initialization.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Shut the transport down. Called when deinitializing, or when initialization fails.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Read `buffer.len()` bytes, starting at `register`.
    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `buffer` to consecutive registers, starting at `register`.
    fn write(&mut self, address: u8, register: u8, buffer: &[u8]) -> Result<(), Self::Error>;
}

/// An [`Interface`] over an `embedded-hal` I²C bus.
///
/// Opening and closing are no-ops, as the bus is already set up when it is given to this type.
#[derive(Clone, Debug)]
pub struct I2cInterface<I2C> {
    bus: I2C,
}

impl<I2C> I2cInterface<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self { bus }
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.bus
    }
}

impl<I2C, E> Interface for I2cInterface<I2C>
where
    I2C: i2c::WriteRead<Error = E> + i2c::Write<Error = E>,
{
    type Error = E;

    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.write_read(address, &[register], buffer)
    }

    fn write(&mut self, address: u8, register: u8, buffer: &[u8]) -> Result<(), Self::Error> {
        for (index, chunk) in buffer.chunks(MAX_WRITE_LENGTH).enumerate() {
            let mut combined: ArrayVec<u8, { MAX_WRITE_LENGTH + 1 }> = ArrayVec::new();
            combined.push(register.wrapping_add((index * MAX_WRITE_LENGTH) as u8));
            // Can't overflow, chunks are at most MAX_WRITE_LENGTH long
            combined.extend(chunk.iter().copied());
            self.bus.write(address, &combined)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use amg88xx_test_data::{MockSensor, Operation};

    use super::*;

    #[test]
    fn read_single_register() {
        let mock = MockSensor::new(0x68);
        mock.set_registers(0x02, &[0x01]);
        let mut interface = I2cInterface::new(mock.clone());
        let mut buf = [0u8; 1];
        interface.read(0x68, 0x02, &mut buf).unwrap();
        assert_eq!(buf, [0x01]);
        assert_eq!(
            mock.operations(),
            [Operation::Read {
                register: 0x02,
                length: 1
            }]
        );
    }

    #[test]
    fn write_single_register() {
        let mock = MockSensor::new(0x69);
        let mut interface = I2cInterface::new(mock.clone());
        interface.write(0x69, 0x07, &[0x20]).unwrap();
        assert_eq!(mock.register(0x07), 0x20);
        assert_eq!(mock.operations().len(), 1);
    }

    #[test]
    fn long_writes_are_split() {
        let mock = MockSensor::new(0x68);
        let mut interface = I2cInterface::new(mock.clone());
        let data = [0xA5u8; MAX_WRITE_LENGTH * 2 + 1];
        interface.write(0x68, 0x20, &data).unwrap();
        let ops = mock.operations();
        assert_eq!(ops.len(), 3);
        let registers: std::vec::Vec<u8> = ops
            .iter()
            .map(|op| match op {
                Operation::Write { register, .. } => *register,
                _ => panic!("Only writes should be performed"),
            })
            .collect();
        assert_eq!(registers, [0x20, 0x30, 0x40]);
        assert_eq!(mock.register(0x40), 0xA5);
    }

    #[test]
    fn wrong_address() {
        let mock = MockSensor::new(0x68);
        let mut interface = I2cInterface::new(mock);
        let mut buf = [0u8; 1];
        assert!(interface.read(0x69, 0x00, &mut buf).is_err());
        assert!(interface.write(0x69, 0x00, &[0]).is_err());
    }
}
