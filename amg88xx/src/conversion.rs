// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between raw register values and temperatures.
//!
//! The AMG8833 uses three different encodings for temperatures, and they are easy to mix up:
//!
//! * The interrupt levels are 12-bit two's complement integers with a resolution of 0.25 ℃.
//! * The thermistor is an 11-bit magnitude with a separate sign bit (bit 11), with a resolution
//!   of 0.0625 ℃.
//! * The pixels are 12-bit two's complement integers with a resolution of 0.25 ℃.
//!
//! All of them are split across two registers, low byte first.
//!
//! The pixels (and the interrupt table) are also stored in the reverse order of what is normally
//! expected of an image. Looking at the sensor, pixel 1 is in the bottom right corner, and pixel
//! 64 is in the top left. The functions here reorder them so that `[0][0]` is the top left.
use bitvec::prelude::*;

use crate::register::{HEIGHT, PIXEL_BYTES, WIDTH};
use crate::util::{i16_from_bits, is_bit_set, word_from_pair};

/// Resolution of the interrupt level registers, in ℃.
pub const LEVEL_RESOLUTION: f32 = 0.25;

/// Resolution of the thermistor registers, in ℃.
pub const THERMISTOR_RESOLUTION: f32 = 0.0625;

/// Resolution of the pixel registers, in ℃.
pub const PIXEL_RESOLUTION: f32 = 0.25;

/// Convert a temperature (in ℃) to the value for an interrupt level register.
///
/// The temperature is divided by the resolution and *truncated* towards zero, not rounded.
pub fn interrupt_level_to_register(temperature: f32) -> i16 {
    (temperature / LEVEL_RESOLUTION) as i16
}

/// Convert an interrupt level register value to a temperature (in ℃).
pub fn register_to_interrupt_level(raw: i16) -> f32 {
    f32::from(raw) * LEVEL_RESOLUTION
}

/// Split an interrupt level into the low and high register bytes.
///
/// Only the lower 12 bits are kept, the upper 4 bits of the high register are unused. Levels
/// outside of -2048 to 2047 do not fit and wrap around.
pub fn encode_interrupt_level(level: i16) -> [u8; 2] {
    let level = level as u16;
    [(level & 0xFF) as u8, ((level >> 8) & 0x0F) as u8]
}

/// Combine the low and high bytes of an interrupt level register.
///
/// Bit 3 of the high byte is the sign bit of the 12-bit value. When it is set, bits 12-15 are
/// filled in with 1s.
pub fn decode_interrupt_level(low: u8, high: u8) -> i16 {
    let word = word_from_pair(low, high & 0x0F);
    if is_bit_set(high, 3) {
        (word | 0xF000) as i16
    } else {
        word as i16
    }
}

/// A reading of the on-board thermistor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermistorReading {
    /// The 12 bits of the thermistor registers, unmodified.
    pub raw: u16,

    /// The temperature, in ℃.
    pub temperature: f32,
}

/// Decode the thermistor registers.
///
/// Unlike the other temperatures, this is *not* two's complement. Bits 0-10 are the magnitude,
/// and bit 11 is the sign.
pub fn decode_thermistor(low: u8, high: u8) -> ThermistorReading {
    let raw = word_from_pair(low, high & 0x0F);
    let mut magnitude = word_from_pair(low, high & 0x07) as i16;
    if is_bit_set(high, 3) {
        magnitude = -magnitude;
    }
    ThermistorReading {
        raw,
        temperature: f32::from(magnitude) * THERMISTOR_RESOLUTION,
    }
}

/// Decode the two bytes for a single pixel into a signed value.
pub fn decode_pixel(low: u8, high: u8) -> i16 {
    i16_from_bits(word_from_pair(low, high), 12)
}

/// Convert a decoded pixel value to a temperature (in ℃).
pub fn pixel_to_celsius(raw: i16) -> f32 {
    f32::from(raw) * PIXEL_RESOLUTION
}

/// One frame of pixel data, with `[0][0]` at the top left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureGrid {
    /// The decoded pixel values.
    pub raw: [[i16; WIDTH]; HEIGHT],

    /// The pixel temperatures, in ℃.
    pub temperatures: [[f32; WIDTH]; HEIGHT],
}

impl Default for TemperatureGrid {
    fn default() -> Self {
        Self {
            raw: [[0; WIDTH]; HEIGHT],
            temperatures: [[0f32; WIDTH]; HEIGHT],
        }
    }
}

impl TemperatureGrid {
    /// The temperature at the given row and column.
    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.temperatures[row][column]
    }

    /// Iterate over the temperatures in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.temperatures.iter().flatten()
    }
}

/// Convert the raw pixel data (as read starting at the first pixel register) into a grid.
///
/// Pixel `k` in the raw data (row `k / 8`, column `k % 8`) ends up at row `7 - k / 8`, column
/// `7 - k % 8`.
pub fn raw_to_temperature_grid(pixel_data: &[u8; PIXEL_BYTES]) -> TemperatureGrid {
    let mut grid = TemperatureGrid::default();
    for (index, bytes) in pixel_data.chunks_exact(2).enumerate() {
        let row = HEIGHT - 1 - index / WIDTH;
        let column = WIDTH - 1 - index % WIDTH;
        let raw = decode_pixel(bytes[0], bytes[1]);
        grid.raw[row][column] = raw;
        grid.temperatures[row][column] = pixel_to_celsius(raw);
    }
    grid
}

/// Which pixels have crossed the interrupt levels.
///
/// Each row is one byte, with the most significant bit being the left-most pixel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptTable {
    rows: [u8; HEIGHT],
}

impl InterruptTable {
    /// The raw bits for one row.
    pub fn row(&self, row: usize) -> u8 {
        self.rows[row]
    }

    /// The raw bits for every row, top row first.
    pub fn rows(&self) -> &[u8; HEIGHT] {
        &self.rows
    }

    /// Check if the pixel at the given row and column has crossed an interrupt level.
    pub fn is_triggered(&self, row: usize, column: usize) -> bool {
        self.rows[row].view_bits::<Msb0>()[column]
    }

    /// Iterate over the `(row, column)` of every triggered pixel.
    pub fn triggered(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, bits)| {
            bits.view_bits::<Msb0>()
                .iter_ones()
                .map(move |column| (row, column))
        })
    }

    /// Check if any pixel has crossed an interrupt level.
    pub fn any(&self) -> bool {
        self.rows.iter().any(|row| *row != 0)
    }
}

/// Reorder the interrupt table registers (indexed by offset from the first table register).
///
/// The first register covers pixels 1-8, which is the bottom row.
pub fn raw_to_interrupt_table(registers: [u8; HEIGHT]) -> InterruptTable {
    let mut rows = [0u8; HEIGHT];
    for (offset, bits) in registers.iter().enumerate() {
        rows[HEIGHT - 1 - offset] = *bits;
    }
    InterruptTable { rows }
}
