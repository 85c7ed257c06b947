// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}

/// Combine a pair of registers (low byte first) into a single word.
pub(crate) fn word_from_pair(low: u8, high: u8) -> u16 {
    u16::from_le_bytes([low, high])
}

/// Create a i16 from a word holding a `num_bits`-bit two's complement integer.
///
/// Any bits above `num_bits` are ignored.
pub(crate) fn i16_from_bits(word: u16, num_bits: u8) -> i16 {
    let shift_amount = 16 - num_bits;
    ((word << shift_amount) as i16) >> shift_amount
}

#[cfg(test)]
mod test {
    #[test]
    fn is_bit_set() {
        for n in 0..8 {
            let value: u8 = 1 << n;
            assert!(
                super::is_bit_set(value, n),
                "is_bit_set was incorrect for bit {}",
                n
            );
            assert!(!super::is_bit_set(!value, n));
        }
    }

    #[test]
    fn word_from_pair() {
        assert_eq!(super::word_from_pair(0xad, 0xde), 0xdead);
        assert_eq!(super::word_from_pair(0x04, 0x00), 0x0004);
    }

    #[test]
    fn i16_from_bits() {
        assert_eq!(super::i16_from_bits(0x00ff, 8), -1);
        assert_eq!(super::i16_from_bits(0x0fff, 12), -1);
        assert_eq!(super::i16_from_bits(0x07ff, 12), 2047);
        assert_eq!(super::i16_from_bits(0x0800, 12), -2048);
        // Now check that upper bits get ignored properly
        assert_eq!(super::i16_from_bits(0xf0ff, 8), -1);
        assert_eq!(super::i16_from_bits(0xf004, 12), 4);
    }
}
