// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The AMG8833 register map, and the types for the values stored in those registers.
//!
//! Every register is a single byte wide. The multi-byte values (interrupt levels, the thermistor
//! and the pixel data) are split across consecutive registers with the low byte first.
use core::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::LibraryError;
use crate::util::is_bit_set;

/// The number of rows of pixels.
pub const HEIGHT: usize = 8;

/// The number of columns of pixels.
pub const WIDTH: usize = 8;

/// The total number of pixels.
pub const NUM_PIXELS: usize = HEIGHT * WIDTH;

/// The number of bytes of pixel data, two bytes for each pixel.
pub const PIXEL_BYTES: usize = NUM_PIXELS * 2;

/// Addresses of the registers in the AMG8833.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Power control (PCTL), holds the operating [mode][Mode].
    PowerControl = 0x00,

    /// Software reset (RST). Write-only.
    Reset = 0x01,

    /// Frame rate (FPSC).
    FrameRate = 0x02,

    /// Interrupt control (INTC).
    InterruptControl = 0x03,

    /// Interrupt and overflow flags (STAT). Read-only.
    Status = 0x04,

    /// Status clear (SCLR). Write-only.
    StatusClear = 0x05,

    /// Moving average mode (AVE).
    Average = 0x07,

    /// Interrupt upper level, lower byte (INTHL).
    InterruptHighLow = 0x08,

    /// Interrupt upper level, upper byte (INTHH).
    InterruptHighHigh = 0x09,

    /// Interrupt lower level, lower byte (INTLL).
    InterruptLowLow = 0x0A,

    /// Interrupt lower level, upper byte (INTLH).
    InterruptLowHigh = 0x0B,

    /// Interrupt hysteresis level, lower byte (IHYSL).
    HysteresisLow = 0x0C,

    /// Interrupt hysteresis level, upper byte (IHYSH).
    HysteresisHigh = 0x0D,

    /// Thermistor output, lower byte (TTHL).
    ThermistorLow = 0x0E,

    /// Thermistor output, upper byte (TTHH).
    ThermistorHigh = 0x0F,

    /// Interrupt table for pixels 1-8 (INT0).
    InterruptTable0 = 0x10,
    InterruptTable1 = 0x11,
    InterruptTable2 = 0x12,
    InterruptTable3 = 0x13,
    InterruptTable4 = 0x14,
    InterruptTable5 = 0x15,
    InterruptTable6 = 0x16,

    /// Interrupt table for pixels 57-64 (INT7).
    InterruptTable7 = 0x17,

    /// Lower byte of pixel 1 (T01L), the start of the pixel data.
    PixelBase = 0x80,
}

impl Register {
    /// The eight interrupt table registers, in ascending address order.
    pub const INTERRUPT_TABLE: [Register; HEIGHT] = [
        Register::InterruptTable0,
        Register::InterruptTable1,
        Register::InterruptTable2,
        Register::InterruptTable3,
        Register::InterruptTable4,
        Register::InterruptTable5,
        Register::InterruptTable6,
        Register::InterruptTable7,
    ];

    /// The address of this register.
    pub fn address(self) -> u8 {
        self.into()
    }

    /// The short name the datasheet uses for this register.
    pub fn name(self) -> &'static str {
        match self {
            Register::PowerControl => "pctl",
            Register::Reset => "rst",
            Register::FrameRate => "fpsc",
            Register::InterruptControl => "intc",
            Register::Status => "stat",
            Register::StatusClear => "sclr",
            Register::Average => "ave",
            Register::InterruptHighLow => "inthl",
            Register::InterruptHighHigh => "inthh",
            Register::InterruptLowLow => "intll",
            Register::InterruptLowHigh => "intlh",
            Register::HysteresisLow => "ihysl",
            Register::HysteresisHigh => "ihysh",
            Register::ThermistorLow => "tthl",
            Register::ThermistorHigh => "tthh",
            Register::InterruptTable0 => "int0",
            Register::InterruptTable1 => "int1",
            Register::InterruptTable2 => "int2",
            Register::InterruptTable3 => "int3",
            Register::InterruptTable4 => "int4",
            Register::InterruptTable5 => "int5",
            Register::InterruptTable6 => "int6",
            Register::InterruptTable7 => "int7",
            Register::PixelBase => "t01l",
        }
    }
}

/// The I²C address of the sensor, selected by the AD_SELECT pin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Address {
    /// AD_SELECT connected to GND.
    Low = 0x68,

    /// AD_SELECT connected to VCC.
    High = 0x69,
}

impl Default for Address {
    fn default() -> Self {
        Self::Low
    }
}

/// Operating modes, stored in the power control register.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Normal mode, the default after power on.
    Normal = 0x00,

    /// Sleep mode.
    Sleep = 0x10,

    /// Stand-by mode, updating every 60 seconds.
    StandBy60 = 0x20,

    /// Stand-by mode, updating every 10 seconds.
    StandBy10 = 0x21,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Normal
    }
}

impl Mode {
    pub(crate) fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Self::try_from(raw).map_err(|_| LibraryError::InvalidData("Invalid operating mode"))
    }
}

/// The commands that can be written to the reset register.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResetType {
    /// Clear the status register and the interrupt table.
    Flag = 0x30,

    /// Return every register to its power-on value, then perform a flag reset.
    Initial = 0x3F,
}

/// Values that occupy a single bit of a register.
pub(crate) trait BitField: Copy {
    fn from_bit(bit: bool) -> Self;

    fn to_bit(self) -> bool;
}

impl BitField for bool {
    fn from_bit(bit: bool) -> Self {
        bit
    }

    fn to_bit(self) -> bool {
        self
    }
}

/// Implement `BitField` for an enum with exactly two variants, 0 and 1.
macro_rules! single_bit_enum {
    ($typ:ident, $zero:ident, $one:ident) => {
        impl BitField for $typ {
            fn from_bit(bit: bool) -> Self {
                if bit {
                    $typ::$one
                } else {
                    $typ::$zero
                }
            }

            fn to_bit(self) -> bool {
                self == $typ::$one
            }
        }
    };
}

/// The frame rates supported by the sensor (bit 0 of the frame rate register).
///
/// `TryFrom<u8>` takes a number of frames per second, not the register bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameRate {
    /// 10 frames per second, the default.
    Ten = 0,

    /// 1 frame per second.
    One = 1,
}

single_bit_enum!(FrameRate, Ten, One);

impl Default for FrameRate {
    fn default() -> Self {
        Self::Ten
    }
}

impl From<FrameRate> for f32 {
    fn from(frame_rate: FrameRate) -> Self {
        match frame_rate {
            FrameRate::Ten => 10f32,
            FrameRate::One => 1f32,
        }
    }
}

impl TryFrom<u8> for FrameRate {
    type Error = LibraryError;

    /// Create a `FrameRate` from a number of frames per second.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Self::Ten),
            1 => Ok(Self::One),
            _ => Err(LibraryError::InvalidData(
                "The given number does not match a valid frame rate",
            )),
        }
    }
}

/// How pixel temperatures are compared against the interrupt levels (bit 1 of the interrupt
/// control register).
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptMode {
    /// Compare the difference from the previous frame.
    Difference = 0,

    /// Compare the absolute temperature.
    Absolute = 1,
}

single_bit_enum!(InterruptMode, Difference, Absolute);

/// Moving average output mode (bit 5 of the average register).
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AverageMode {
    /// No moving average, the default.
    Once = 0,

    /// Twice moving average.
    Twice = 1,
}

single_bit_enum!(AverageMode, Once, Twice);

/// The flags in the status register.
///
/// The discriminant is the bit index of the flag within the status (and status clear) register.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusFlag {
    /// At least one pixel has crossed an interrupt level.
    InterruptOutbreak = 0,

    /// A pixel temperature overflowed.
    TemperatureOverflow = 1,

    /// The thermistor temperature overflowed.
    ThermistorOverflow = 2,
}

impl StatusFlag {
    /// Every flag, in the order they are dispatched by the interrupt handler.
    pub const ALL: [StatusFlag; 3] = [
        StatusFlag::InterruptOutbreak,
        StatusFlag::TemperatureOverflow,
        StatusFlag::ThermistorOverflow,
    ];

    /// The bit index of this flag.
    pub fn bit(self) -> u8 {
        self.into()
    }

    /// A mask with only this flag's bit set.
    pub fn mask(self) -> u8 {
        1 << self.bit()
    }
}

/// The contents of the status register.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw register value.
    pub fn raw(&self) -> u8 {
        self.0
    }

    pub fn is_set(&self, flag: StatusFlag) -> bool {
        is_bit_set(self.0, flag.bit() as usize)
    }

    pub fn interrupt_outbreak(&self) -> bool {
        self.is_set(StatusFlag::InterruptOutbreak)
    }

    pub fn temperature_overflow(&self) -> bool {
        self.is_set(StatusFlag::TemperatureOverflow)
    }

    pub fn thermistor_overflow(&self) -> bool {
        self.is_set(StatusFlag::ThermistorOverflow)
    }

    /// Iterate over the set flags, in dispatch order.
    pub fn flags(self) -> impl Iterator<Item = StatusFlag> {
        StatusFlag::ALL
            .into_iter()
            .filter(move |flag| self.is_set(*flag))
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_addresses() {
        assert_eq!(Register::PowerControl.address(), 0x00);
        assert_eq!(Register::Average.address(), 0x07);
        assert_eq!(Register::HysteresisHigh.address(), 0x0D);
        assert_eq!(Register::ThermistorHigh.address(), 0x0F);
        assert_eq!(Register::PixelBase.address(), 0x80);
        // The interrupt table is a contiguous block
        for (offset, register) in Register::INTERRUPT_TABLE.iter().enumerate() {
            assert_eq!(register.address(), 0x10 + offset as u8);
        }
        // 0x06 is reserved
        assert!(Register::try_from(0x06).is_err());
    }

    #[test]
    fn mode_from_raw() {
        assert_eq!(Mode::from_raw(0x00).unwrap(), Mode::Normal);
        assert_eq!(Mode::from_raw(0x10).unwrap(), Mode::Sleep);
        assert_eq!(Mode::from_raw(0x20).unwrap(), Mode::StandBy60);
        assert_eq!(Mode::from_raw(0x21).unwrap(), Mode::StandBy10);
        assert_eq!(
            Mode::from_raw(0x11),
            Err(LibraryError::InvalidData("Invalid operating mode"))
        );
    }

    #[test]
    fn mode_round_trip() {
        for mode in [Mode::Normal, Mode::Sleep, Mode::StandBy60, Mode::StandBy10] {
            let raw: u8 = mode.into();
            assert_eq!(Mode::from_raw(raw).unwrap(), mode);
        }
    }

    #[test]
    fn single_bit_fields() {
        assert_eq!(FrameRate::from_bit(false), FrameRate::Ten);
        assert_eq!(FrameRate::from_bit(true), FrameRate::One);
        assert!(!InterruptMode::Difference.to_bit());
        assert!(InterruptMode::Absolute.to_bit());
        assert_eq!(AverageMode::from_bit(true), AverageMode::Twice);
        assert!(bool::from_bit(true));
    }

    #[test]
    fn frame_rate_conversions() {
        assert_eq!(FrameRate::try_from(10u8).unwrap(), FrameRate::Ten);
        assert_eq!(FrameRate::try_from(1u8).unwrap(), FrameRate::One);
        assert!(FrameRate::try_from(2u8).is_err());
        // 0 is the register bit for 10 FPS, but not a frame rate
        assert!(FrameRate::try_from(0u8).is_err());
        assert_eq!(f32::from(FrameRate::Ten), 10f32);
        assert_eq!(f32::from(FrameRate::One), 1f32);
        assert_eq!(FrameRate::default(), FrameRate::Ten);
    }

    #[test]
    fn status_flags() {
        let status = Status::from_raw(0b0000_0101);
        assert!(status.interrupt_outbreak());
        assert!(!status.temperature_overflow());
        assert!(status.thermistor_overflow());
        let mut flags = status.flags();
        assert_eq!(flags.next(), Some(StatusFlag::InterruptOutbreak));
        assert_eq!(flags.next(), Some(StatusFlag::ThermistorOverflow));
        assert_eq!(flags.next(), None);
    }

    #[test]
    fn status_flag_masks() {
        assert_eq!(StatusFlag::InterruptOutbreak.mask(), 0x01);
        assert_eq!(StatusFlag::TemperatureOverflow.mask(), 0x02);
        assert_eq!(StatusFlag::ThermistorOverflow.mask(), 0x04);
    }
}
