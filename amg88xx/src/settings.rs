// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Groups of settings that can be applied to a sensor in one go.
//!
//! See [`Amg8833::configure`][crate::Amg8833::configure].
use crate::register::{AverageMode, FrameRate, InterruptMode, Mode};

/// Interrupt levels (in ℃) and the comparison mode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptSettings {
    pub mode: InterruptMode,

    pub high_level: f32,

    pub low_level: f32,

    pub hysteresis_level: f32,
}

/// Sensor settings.
///
/// The default is a plain continuous readout: normal mode, 10 FPS, twice moving average and no
/// interrupts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub mode: Mode,

    pub frame_rate: FrameRate,

    pub average_mode: AverageMode,

    /// `None` disables the interrupt output.
    pub interrupt: Option<InterruptSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            frame_rate: FrameRate::Ten,
            average_mode: AverageMode::Twice,
            interrupt: None,
        }
    }
}

impl Settings {
    /// Settings for watching for pixels crossing the given levels (in ℃).
    ///
    /// The frame rate is lowered to 1 FPS.
    pub fn interrupt(
        mode: InterruptMode,
        high_level: f32,
        low_level: f32,
        hysteresis_level: f32,
    ) -> Self {
        Self {
            frame_rate: FrameRate::One,
            interrupt: Some(InterruptSettings {
                mode,
                high_level,
                low_level,
                hysteresis_level,
            }),
            ..Self::default()
        }
    }
}
