// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A full session against a mocked sensor, through the public API only.
use std::sync::atomic::{AtomicUsize, Ordering};

use float_cmp::assert_approx_eq;

use amg88xx::{
    Address, Amg8833, Error, FrameRate, I2cInterface, InterruptMode, LibraryError, Mode,
    Settings, StatusFlag,
};
use amg88xx_test_data::{MockDelay, MockSensor, Operation, HAND_FRAME};

type Sensor = Amg8833<I2cInterface<MockSensor>, MockDelay>;

static OUTBREAKS: AtomicUsize = AtomicUsize::new(0);

fn ignore_line(_line: &str) {}

fn count_outbreaks(flag: StatusFlag) {
    if flag == StatusFlag::InterruptOutbreak {
        OUTBREAKS.fetch_add(1, Ordering::SeqCst);
    }
}

fn sensor_at(mock: &MockSensor, address: Address) -> Sensor {
    Amg8833::new(address)
        .link_interface(I2cInterface::new(mock.clone()))
        .link_delay(mock.delay())
        .link_debug_print(ignore_line)
        .link_receive_callback(count_outbreaks)
}

#[test]
fn hand_in_view() {
    let mock = MockSensor::new(0x69);
    let mut sensor = sensor_at(&mock, Address::High);
    sensor.init().unwrap();
    sensor.configure(&Settings::default()).unwrap();
    assert_eq!(sensor.mode().unwrap(), Mode::Normal);
    assert_eq!(sensor.frame_rate().unwrap(), FrameRate::Ten);

    mock.set_registers(0x0E, &[0x68, 0x01]);
    mock.set_pixels(&HAND_FRAME);
    let thermistor = sensor.read_temperature().unwrap();
    assert_approx_eq!(f32, thermistor.temperature, 22.5);
    let grid = sensor.read_temperature_array().unwrap();
    let warm = grid.iter().filter(|t| **t > 30.0).count();
    assert_eq!(warm, 16);
    for row in 0..4 {
        for column in 4..8 {
            assert!(grid.get(row, column) > 30.0, "({}, {})", row, column);
        }
    }

    sensor.deinit().unwrap();
    assert_eq!(mock.register(0x00), 0x10, "The sensor should be asleep");
    assert!(matches!(
        sensor.read_temperature(),
        Err(Error::Library(LibraryError::NotInitialized))
    ));
}

#[test]
fn interrupt_session() {
    let mock = MockSensor::new(0x68);
    let mut sensor = sensor_at(&mock, Address::Low);
    sensor.init().unwrap();
    let settings = Settings::interrupt(InterruptMode::Absolute, 30.0, 10.0, 1.0);
    sensor.configure(&settings).unwrap();
    assert!(sensor.interrupt_enabled().unwrap());

    // Pretend the sensor caught the hand in the top right corner.
    mock.set_registers(0x10, &[0, 0, 0, 0, 0x0F, 0x0F, 0x0F, 0x0F]);
    mock.set_status(0b0000_0001);
    let before = OUTBREAKS.load(Ordering::SeqCst);
    let dispatched = sensor.irq_handler().unwrap();
    assert_eq!(dispatched.as_slice(), &[StatusFlag::InterruptOutbreak]);
    assert_eq!(OUTBREAKS.load(Ordering::SeqCst), before + 1);
    assert_eq!(mock.status(), 0);

    let table = sensor.interrupt_table().unwrap();
    assert_eq!(table.triggered().count(), 16);
    assert!(table.is_triggered(0, 4));
    assert!(table.is_triggered(3, 7));
    assert!(!table.is_triggered(4, 7));
    assert!(!table.is_triggered(0, 3));
}

#[test]
fn long_register_writes_are_split() {
    let mock = MockSensor::new(0x68);
    let mut sensor = sensor_at(&mock, Address::Low);
    sensor.init().unwrap();
    mock.clear_operations();
    // Writing past the setting registers isn't something the real sensor allows, but the mock
    // doesn't mind for registers it doesn't know about.
    let data = [0x11u8; 20];
    sensor.set_register(0x20, &data).unwrap();
    assert_eq!(
        mock.operations(),
        [
            Operation::write(0x20, &data[..16]),
            Operation::write(0x30, &data[16..]),
        ]
    );
}
