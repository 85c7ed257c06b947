// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust driver for the Panasonic AMG8833 8x8 thermopile array (Grid-EYE) over I²C.
//!
//! The sensor reports 64 pixel temperatures and the temperature of an onboard thermistor. It can
//! also raise an interrupt when pixels cross an upper or lower level, with an interrupt table
//! recording which pixels did.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C and delay traits, meaning you should
//! be able to use this library on other platforms, as long as there's an `embedded-hal`
//! implementation available. This library is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/0.2/embedded_hal/blocking/i2c/index.html
//!
//! # Usage
//! ```no_run
//! use amg88xx::{Address, Amg8833, I2cInterface, Settings, StatusFlag};
//! use linux_embedded_hal::{Delay, I2cdev};
//!
//! fn print_line(line: &str) {
//!     eprintln!("{}", line);
//! }
//!
//! fn on_interrupt(flag: StatusFlag) {
//!     println!("{:?}", flag);
//! }
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! // The default address is 0x68, with AD_SELECT tied low
//! let mut sensor = Amg8833::new(Address::Low)
//!     .link_interface(I2cInterface::new(i2c_bus))
//!     .link_delay(Delay)
//!     .link_debug_print(print_line)
//!     .link_receive_callback(on_interrupt);
//! sensor.init()?;
//! sensor.configure(&Settings::default())?;
//! let thermistor = sensor.read_temperature()?;
//! let grid = sensor.read_temperature_array()?;
//! println!("Thermistor: {}℃, center pixel: {}℃", thermistor.temperature, grid.get(4, 4));
//! sensor.deinit()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//! The driver starts out with nothing but an address. The bus (wrapped in an [`Interface`]), a
//! delay, a debug output sink and an interrupt callback are linked in, and then [`Amg8833::init`]
//! wakes the sensor up and resets it. Every other operation requires an initialized driver.
//!
//! # Orientation
//! The sensor reports pixels starting from the bottom right (looking at the sensor from the
//! front). [`TemperatureGrid`] and [`InterruptTable`] are both reordered so that row 0, column 0
//! is the top left.
//!
//! # Interrupts
//! Wire the sensor's INT pin to something that calls [`Amg8833::irq_handler`]. The handler reads
//! and clears the status register, calling the linked callback once for each [flag][StatusFlag]
//! that was set. The low-level conversions in [`conversion`] are available for building levels
//! or decoding raw register data directly.

#![no_std]
#![allow(clippy::float_cmp)]

pub mod conversion;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod interface;
pub mod register;
pub mod settings;
mod util;

#[doc(inline)]
pub use conversion::{InterruptTable, TemperatureGrid, ThermistorReading};
#[doc(inline)]
pub use driver::{Amg8833, ChipInfo, DebugPrint, ReceiveCallback, CHIP_INFO};
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use interface::{I2cInterface, Interface};
pub use register::*;
pub use settings::{InterruptSettings, Settings};

#[cfg(test)]
mod test;
