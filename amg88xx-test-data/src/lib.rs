// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod frame_data;
mod i2c_mock;

pub use frame_data::{indexed_frame, uniform_frame, HAND_FRAME};
pub use i2c_mock::{MockDelay, MockError, MockSensor, Operation};
