// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// The number of bytes of pixel data in a frame.
const PIXEL_BYTES: usize = 128;

/// A frame with every pixel set to the same raw value (in units of 0.25℃).
pub fn uniform_frame(raw: i16) -> [u8; PIXEL_BYTES] {
    let bytes = raw.to_le_bytes();
    let mut frame = [0u8; PIXEL_BYTES];
    frame.chunks_exact_mut(2).for_each(|pixel| {
        pixel[0] = bytes[0];
        // Only 12 bits are used by the sensor.
        pixel[1] = bytes[1] & 0x0F;
    });
    frame
}

/// A frame where each pixel's raw value is its index in the sensor's native order (pixel 1 is 0,
/// pixel 64 is 63).
pub fn indexed_frame() -> [u8; PIXEL_BYTES] {
    let mut frame = [0u8; PIXEL_BYTES];
    frame
        .chunks_exact_mut(2)
        .enumerate()
        .for_each(|(index, pixel)| pixel[0] = index as u8);
    frame
}

/// A hand held in front of part of the sensor in a 22.5℃ room.
///
/// In native order, pixels 33-36, 41-44, 49-52 and 57-60 are warm and everything else is 22.5℃.
/// Once reordered, that is the top right quarter of the grid: columns 6 and 7 are 32.0℃, columns
/// 4 and 5 are 31.25℃.
pub const HAND_FRAME: [u8; PIXEL_BYTES] = [
    // Pixels 1-8
    0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 9-16
    0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 17-24
    0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 25-32
    0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 33-40
    0x80, 0x00, 0x80, 0x00, 0x7D, 0x00, 0x7D, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 41-48
    0x80, 0x00, 0x80, 0x00, 0x7D, 0x00, 0x7D, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 49-56
    0x80, 0x00, 0x80, 0x00, 0x7D, 0x00, 0x7D, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
    // Pixels 57-64
    0x80, 0x00, 0x80, 0x00, 0x7D, 0x00, 0x7D, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0x5A, 0x00,
];
