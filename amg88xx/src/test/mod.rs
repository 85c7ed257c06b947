// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
extern crate std;

use core::cell::RefCell;
use std::string::{String, ToString};
use std::vec::Vec;

use amg88xx_test_data::{MockDelay, MockError, MockSensor};
use embedded_hal::blocking::i2c;

use crate::{Address, Amg8833, Interface, StatusFlag};

pub(crate) const ADDRESS: u8 = 0x68;

pub(crate) type MockDriver = Amg8833<MockSensor, MockDelay>;

// Unlike I2cInterface, this passes open and close through to the mock, so failures can be
// injected for them.
impl Interface for MockSensor {
    type Error = MockError;

    fn open(&mut self) -> Result<(), Self::Error> {
        MockSensor::open(self)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        MockSensor::close(self)
    }

    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        i2c::WriteRead::write_read(self, address, &[register], buffer)
    }

    fn write(&mut self, address: u8, register: u8, buffer: &[u8]) -> Result<(), Self::Error> {
        let mut combined = Vec::with_capacity(buffer.len() + 1);
        combined.push(register);
        combined.extend_from_slice(buffer);
        i2c::Write::write(self, address, &combined)
    }
}

// Each test runs on its own thread, so these don't leak between tests.
std::thread_local! {
    static DEBUG_MESSAGES: RefCell<Vec<String>> = RefCell::new(Vec::new());
    static RECEIVED_FLAGS: RefCell<Vec<StatusFlag>> = RefCell::new(Vec::new());
}

pub(crate) fn record_debug(message: &str) {
    DEBUG_MESSAGES.with(|messages| messages.borrow_mut().push(message.to_string()));
}

pub(crate) fn record_flag(flag: StatusFlag) {
    RECEIVED_FLAGS.with(|flags| flags.borrow_mut().push(flag));
}

/// Take the debug messages recorded on this thread.
pub(crate) fn debug_messages() -> Vec<String> {
    DEBUG_MESSAGES.with(|messages| messages.take())
}

/// Take the status flags dispatched on this thread.
pub(crate) fn received_flags() -> Vec<StatusFlag> {
    RECEIVED_FLAGS.with(|flags| flags.take())
}

/// A driver with everything linked, but not initialized.
pub(crate) fn linked_driver(mock: &MockSensor) -> MockDriver {
    Amg8833::new(Address::Low)
        .link_interface(mock.clone())
        .link_delay(mock.delay())
        .link_debug_print(record_debug)
        .link_receive_callback(record_flag)
}

/// An initialized driver, with the mock's operation log cleared.
pub(crate) fn initialized_driver(mock: &MockSensor) -> MockDriver {
    let mut sensor = linked_driver(mock);
    sensor.init().unwrap();
    mock.clear_operations();
    sensor
}
