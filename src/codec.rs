//! Byte-to-bit conversion for the single-byte frame payload.
//!
//! The payload of one frame is exactly one byte, carried as eight binary
//! symbols most significant bit first. This module provides the two pure,
//! stateless halves of that translation plus the strict validation the
//! receive path relies on: a frame that is not exactly eight bits of 0/1
//! never decodes.
//!
//! ## Functions
//!
//! - [`byte_to_bits`]: expands a byte into its eight wire symbols
//! - [`bits_to_byte`]: reassembles a byte, rejecting malformed frames
//!
//! The two are exact inverses for every input byte.

use crate::consts::FRAME_BITS;
use crate::error::LinkError;

/// Expands a byte into its eight payload bits, most significant bit first.
///
/// `0xA2` (`0b1010_0010`) becomes `[1, 0, 1, 0, 0, 0, 1, 0]`.
pub fn byte_to_bits(value: u8) -> [u8; FRAME_BITS] {
    let mut bits = [0u8; FRAME_BITS];
    for (i, slot) in bits.iter_mut().enumerate() {
        *slot = (value >> (FRAME_BITS - 1 - i)) & 1;
    }
    bits
}

/// Reassembles a byte from eight payload bits, most significant bit first.
///
/// Fails with [`LinkError::MalformedFrame`] if the slice does not hold
/// exactly [`FRAME_BITS`] elements or any element is not 0 or 1. A short,
/// long, or non-binary frame must never silently decode to a
/// wrong-but-plausible byte.
pub fn bits_to_byte(bits: &[u8]) -> Result<u8, LinkError> {
    if bits.len() != FRAME_BITS {
        return Err(LinkError::MalformedFrame("frame is not exactly 8 bits"));
    }
    let mut value: u8 = 0;
    for &bit in bits {
        match bit {
            0 | 1 => value = (value << 1) | bit,
            _ => return Err(LinkError::MalformedFrame("bit value outside 0/1")),
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_byte() {
        for value in 0..=u8::MAX {
            let bits = byte_to_bits(value);
            assert_eq!(bits_to_byte(&bits), Ok(value));
        }
    }

    #[test]
    fn expands_msb_first() {
        assert_eq!(byte_to_bits(0b1010_1010), [1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(byte_to_bits(0b0010_1010), [0, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(byte_to_bits(0x80), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(byte_to_bits(0x01), [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert!(matches!(
            bits_to_byte(&[]),
            Err(LinkError::MalformedFrame(_))
        ));
        assert!(matches!(
            bits_to_byte(&[1, 0, 1, 0, 1, 0, 1]),
            Err(LinkError::MalformedFrame(_))
        ));
        assert!(matches!(
            bits_to_byte(&[1, 0, 1, 0, 1, 0, 1, 0, 1]),
            Err(LinkError::MalformedFrame(_))
        ));
    }

    #[test]
    fn rejects_non_binary_elements() {
        assert!(matches!(
            bits_to_byte(&[0, 1, 2, 0, 1, 0, 1, 0]),
            Err(LinkError::MalformedFrame(_))
        ));
        assert!(matches!(
            bits_to_byte(&[255, 0, 0, 0, 0, 0, 0, 0]),
            Err(LinkError::MalformedFrame(_))
        ));
    }
}
