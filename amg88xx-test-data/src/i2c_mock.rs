// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::vec::Vec;

use arrayvec::ArrayVec;
use embedded_hal::blocking::{delay, i2c};

/// The AMG8833 has a single byte of register address space.
const REGISTER_COUNT: usize = 256;

const RESET_REGISTER: u8 = 0x01;
const STATUS_REGISTER: u8 = 0x04;
const STATUS_CLEAR_REGISTER: u8 = 0x05;
const INTERRUPT_TABLE_START: u8 = 0x10;
const INTERRUPT_TABLE_END: u8 = 0x17;

const FLAG_RESET: u8 = 0x30;
const INITIAL_RESET: u8 = 0x3F;

/// Registers that are reset to 0 by an initial reset. The thermistor, interrupt table and pixel
/// data are measurements, so they're left alone.
const SETTING_REGISTERS: [u8; 11] = [
    0x00, 0x02, 0x03, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, STATUS_REGISTER,
];

/// The most register bytes recorded for a single write.
const RECORDED_WRITE_LENGTH: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// The register is read-only.
    IllegalWrite(u8),

    /// The requested operation is not allowed.
    ///
    /// This covers things like a write without a register address, or a write-read that writes
    /// more than a register address.
    IllegalOperation,

    /// A failure was requested for this register.
    InjectedFailure(u8),

    /// A failure was requested for opening the bus.
    OpenFailure,

    /// A failure was requested for closing the bus.
    CloseFailure,
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for MockError {}

/// Everything that has been done to the mock, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Open,
    Close,
    Read {
        register: u8,
        length: usize,
    },
    /// Only the first 16 bytes of data are recorded.
    Write {
        register: u8,
        data: ArrayVec<u8, RECORDED_WRITE_LENGTH>,
    },
    Delay {
        ms: u32,
    },
}

impl Operation {
    /// Shorthand for creating a `Write` operation.
    pub fn write(register: u8, data: &[u8]) -> Self {
        Operation::Write {
            register,
            data: data.iter().copied().take(RECORDED_WRITE_LENGTH).collect(),
        }
    }
}

#[derive(Debug)]
struct MockState {
    registers: [u8; REGISTER_COUNT],
    operations: Vec<Operation>,
    failing_reads: BTreeSet<u8>,
    failing_writes: BTreeSet<u8>,
    fail_open: bool,
    fail_close: bool,
    is_open: bool,
}

/// A mock AMG8833 on an I²C bus.
///
/// Clones share the same state, so a clone can be kept to inspect the mock after the original has
/// been handed off to a driver.
#[derive(Clone, Debug)]
pub struct MockSensor {
    i2c_address: u8,
    state: Rc<RefCell<MockState>>,
}

impl MockSensor {
    /// Create a mock with every register set to 0.
    pub fn new(i2c_address: u8) -> Self {
        Self {
            i2c_address,
            state: Rc::new(RefCell::new(MockState {
                registers: [0u8; REGISTER_COUNT],
                operations: Vec::new(),
                failing_reads: BTreeSet::new(),
                failing_writes: BTreeSet::new(),
                fail_open: false,
                fail_close: false,
                is_open: false,
            })),
        }
    }

    /// A delay that records itself in this mock's operations and returns immediately.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            state: Rc::clone(&self.state),
        }
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.borrow().registers[register as usize]
    }

    /// Set registers directly, bypassing the read-only checks and without recording an operation.
    pub fn set_registers(&self, start: u8, data: &[u8]) {
        let start = start as usize;
        self.state.borrow_mut().registers[start..(start + data.len())].copy_from_slice(data);
    }

    /// Replace the pixel data.
    pub fn set_pixels(&self, pixel_data: &[u8]) {
        self.set_registers(0x80, pixel_data);
    }

    pub fn set_status(&self, status: u8) {
        self.set_registers(STATUS_REGISTER, &[status]);
    }

    pub fn status(&self) -> u8 {
        self.register(STATUS_REGISTER)
    }

    /// Make reads that include the given register fail.
    pub fn fail_reads_at(&self, register: u8) {
        self.state.borrow_mut().failing_reads.insert(register);
    }

    /// Make writes that include the given register fail.
    pub fn fail_writes_at(&self, register: u8) {
        self.state.borrow_mut().failing_writes.insert(register);
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.borrow_mut().fail_close = fail;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failing_reads.clear();
        state.failing_writes.clear();
        state.fail_open = false;
        state.fail_close = false;
    }

    /// Every operation since creation (or the last call to `clear_operations`), oldest first.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    /// Simulate opening the bus.
    pub fn open(&self) -> Result<(), MockError> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Open);
        if state.fail_open {
            return Err(MockError::OpenFailure);
        }
        state.is_open = true;
        Ok(())
    }

    /// Simulate closing the bus.
    pub fn close(&self) -> Result<(), MockError> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Close);
        if state.fail_close {
            return Err(MockError::CloseFailure);
        }
        state.is_open = false;
        Ok(())
    }

    fn check_address(&self, i2c_address: u8) -> Result<(), MockError> {
        if i2c_address == self.i2c_address {
            Ok(())
        } else {
            Err(MockError::UnknownI2cAddress(i2c_address))
        }
    }
}

impl MockState {
    fn read(&mut self, start: u8, buffer: &mut [u8]) -> Result<(), MockError> {
        self.operations.push(Operation::Read {
            register: start,
            length: buffer.len(),
        });
        let start = start as usize;
        let end = start + buffer.len();
        if end > REGISTER_COUNT {
            return Err(MockError::IllegalOperation);
        }
        if let Some(register) = self
            .failing_reads
            .range((start as u8)..=((end - 1) as u8))
            .next()
        {
            return Err(MockError::InjectedFailure(*register));
        }
        buffer.copy_from_slice(&self.registers[start..end]);
        Ok(())
    }

    fn write(&mut self, start: u8, data: &[u8]) -> Result<(), MockError> {
        self.operations.push(Operation::write(start, data));
        let start = start as usize;
        let end = start + data.len();
        if end > REGISTER_COUNT {
            return Err(MockError::IllegalOperation);
        }
        if let Some(register) = self
            .failing_writes
            .range((start as u8)..=((end - 1) as u8))
            .next()
        {
            return Err(MockError::InjectedFailure(*register));
        }
        for (register, value) in (start..end).zip(data.iter().copied()) {
            let register = register as u8;
            match register {
                RESET_REGISTER => self.reset(value),
                STATUS_CLEAR_REGISTER => {
                    self.registers[STATUS_REGISTER as usize] &= !value;
                }
                STATUS_REGISTER | 0x0E | 0x0F => return Err(MockError::IllegalWrite(register)),
                INTERRUPT_TABLE_START..=INTERRUPT_TABLE_END => {
                    return Err(MockError::IllegalWrite(register))
                }
                0x80..=0xFF => return Err(MockError::IllegalWrite(register)),
                _ => (),
            }
            self.registers[register as usize] = value;
        }
        Ok(())
    }

    fn reset(&mut self, command: u8) {
        if command == INITIAL_RESET {
            for register in SETTING_REGISTERS.iter() {
                self.registers[*register as usize] = 0;
            }
        }
        if command == FLAG_RESET || command == INITIAL_RESET {
            self.registers[STATUS_REGISTER as usize] = 0;
            let table = (INTERRUPT_TABLE_START as usize)..=(INTERRUPT_TABLE_END as usize);
            self.registers[table].iter_mut().for_each(|r| *r = 0);
        }
    }
}

impl i2c::Write for MockSensor {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_address(i2c_address)?;
        let (register, data) = bytes.split_first().ok_or(MockError::IllegalOperation)?;
        self.state.borrow_mut().write(*register, data)
    }
}

impl i2c::WriteRead for MockSensor {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_address(i2c_address)?;
        // Write-reads should only be writing the register address
        if bytes.len() != 1 || buffer.is_empty() {
            return Err(MockError::IllegalOperation);
        }
        self.state.borrow_mut().read(bytes[0], buffer)
    }
}

/// A delay that doesn't, recording the requested time in the mock's operations.
#[derive(Clone, Debug)]
pub struct MockDelay {
    state: Rc<RefCell<MockState>>,
}

impl delay::DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.state
            .borrow_mut()
            .operations
            .push(Operation::Delay { ms });
    }
}

#[cfg(test)]
mod test {
    use embedded_hal::blocking::delay::DelayMs;
    use embedded_hal::blocking::i2c::{Write, WriteRead};

    use super::*;

    #[test]
    fn status_clear() {
        let mut mock = MockSensor::new(0x68);
        mock.set_status(0b0000_0111);
        mock.write(0x68, &[STATUS_CLEAR_REGISTER, 0b0000_0010]).unwrap();
        assert_eq!(mock.status(), 0b0000_0101);
    }

    #[test]
    fn flag_reset() {
        let mut mock = MockSensor::new(0x68);
        mock.set_status(0b0000_0111);
        mock.set_registers(INTERRUPT_TABLE_START, &[0xFF; 8]);
        mock.set_registers(0x02, &[0x01]);
        mock.write(0x68, &[RESET_REGISTER, FLAG_RESET]).unwrap();
        assert_eq!(mock.status(), 0);
        assert_eq!(mock.register(INTERRUPT_TABLE_END), 0);
        // Settings are kept
        assert_eq!(mock.register(0x02), 0x01);
    }

    #[test]
    fn initial_reset() {
        let mut mock = MockSensor::new(0x68);
        mock.set_registers(0x02, &[0x01]);
        mock.set_pixels(&[0x10; 128]);
        mock.write(0x68, &[RESET_REGISTER, INITIAL_RESET]).unwrap();
        assert_eq!(mock.register(0x02), 0);
        assert_eq!(mock.register(0x80), 0x10);
    }

    #[test]
    fn read_only_registers() {
        let mut mock = MockSensor::new(0x68);
        assert_eq!(
            mock.write(0x68, &[STATUS_REGISTER, 0x01]),
            Err(MockError::IllegalWrite(STATUS_REGISTER))
        );
        assert_eq!(
            mock.write(0x68, &[0x80, 0x01]),
            Err(MockError::IllegalWrite(0x80))
        );
    }

    #[test]
    fn injected_failures() {
        let mut mock = MockSensor::new(0x68);
        mock.fail_reads_at(0x90);
        let mut buf = [0u8; 128];
        assert_eq!(
            mock.write_read(0x68, &[0x80], &mut buf),
            Err(MockError::InjectedFailure(0x90))
        );
        mock.clear_failures();
        assert!(mock.write_read(0x68, &[0x80], &mut buf).is_ok());
        mock.fail_open(true);
        assert_eq!(mock.open(), Err(MockError::OpenFailure));
        assert!(!mock.is_open());
    }

    #[test]
    fn operations_are_shared() {
        let mut mock = MockSensor::new(0x68);
        let clone = mock.clone();
        let mut delay = mock.delay();
        mock.write(0x68, &[0x00, 0x10]).unwrap();
        delay.delay_ms(50);
        assert_eq!(
            clone.operations(),
            [Operation::write(0x00, &[0x10]), Operation::Delay { ms: 50 }]
        );
        clone.clear_operations();
        assert!(mock.operations().is_empty());
    }
}
