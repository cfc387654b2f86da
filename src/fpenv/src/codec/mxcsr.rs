//! Bit layout of the SSE MXCSR register.
//!
//! ```text
//! FZ:RC:RC:PM:UM:OM:ZM:DM:IM:DAZ:PE:UE:OE:ZE:DE:IE
//! 15 14 13 12 11 10  9  8  7   6  5  4  3  2  1  0
//! ```
//!
//! The exception mask field carries the same flags as the 387 control word
//! shifted left by seven, and the rounding field is the 387 RC field shifted
//! left by three. Call sites never see either shift; the codec absorbs it.

use crate::codec::x87;
use crate::flags::{ExceptionFlags, RoundingMode};

/// Sticky exception status bits, 0..5, in the 387 mask layout.
pub const STATUS_FIELD: u32 = 0x0000_003F;
/// Denormals-are-zero: treat denormal inputs as zero.
pub const DAZ: u32 = 0x0000_0040;
/// Exception mask field, bits 7..12. A set bit masks the exception.
pub const EXCEPTION_MASK_FIELD: u32 = 0x0000_1F80;
/// Rounding control field, bits 13..14.
pub const ROUNDING_FIELD: u32 = 0x0000_6000;
/// Flush-to-zero: round denormal results to zero.
pub const FTZ: u32 = 0x0000_8000;

/// Every architecturally defined MXCSR bit. Writing a set reserved bit
/// raises a general-protection fault, so register writes are clamped to
/// this mask.
pub const DEFINED_BITS: u32 = 0x0000_FFFF;

/// Offset of the mask field relative to the 387 control word layout.
pub const EXCEPTION_MASK_SHIFT: u32 = 7;
/// Offset of the rounding field relative to the 387 RC field.
pub const ROUNDING_SHIFT: u32 = 3;

/// Encode a rounding mode into the MXCSR RC field.
pub fn encode_rounding(mode: RoundingMode) -> u32 {
    u32::from(x87::encode_rounding(mode)) << ROUNDING_SHIFT
}

/// Decode the MXCSR RC field. Total, like its 387 counterpart.
pub fn decode_rounding(mxcsr: u32) -> RoundingMode {
    x87::decode_rounding(((mxcsr & ROUNDING_FIELD) >> ROUNDING_SHIFT) as u16)
}

/// Encode an exception set into the MXCSR mask field.
pub fn encode_exception_mask(flags: ExceptionFlags) -> u32 {
    (flags.bits() << EXCEPTION_MASK_SHIFT) & EXCEPTION_MASK_FIELD
}

/// Decode the MXCSR mask field.
pub fn decode_exception_mask(mxcsr: u32) -> ExceptionFlags {
    ExceptionFlags::from_bits_truncate((mxcsr & EXCEPTION_MASK_FIELD) >> EXCEPTION_MASK_SHIFT)
}

/// Encode an exception set into the sticky status field.
pub fn encode_status(flags: ExceptionFlags) -> u32 {
    flags.bits() & STATUS_FIELD
}

/// Decode the sticky status field.
pub fn decode_status(mxcsr: u32) -> ExceptionFlags {
    ExceptionFlags::from_bits_truncate(mxcsr & STATUS_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn rounding_round_trips() {
        for mode in RoundingMode::iter() {
            assert_eq!(decode_rounding(encode_rounding(mode)), mode);
        }
    }

    #[test]
    fn mask_field_is_the_x87_field_shifted_by_seven() {
        for bits in 0..=ExceptionFlags::all().bits() {
            let Some(flags) = ExceptionFlags::from_bits(bits) else {
                continue;
            };
            assert_eq!(
                encode_exception_mask(flags),
                u32::from(x87::encode_exception_mask(flags)) << EXCEPTION_MASK_SHIFT
            );
            assert_eq!(decode_exception_mask(encode_exception_mask(flags)), flags);
        }
    }

    #[test]
    fn fields_do_not_overlap() {
        let fields = [STATUS_FIELD, DAZ, EXCEPTION_MASK_FIELD, ROUNDING_FIELD, FTZ];
        let mut seen = 0u32;
        for field in fields {
            assert_eq!(seen & field, 0);
            seen |= field;
        }
        assert_eq!(seen, DEFINED_BITS);
    }

    proptest! {
        #[test]
        fn decodes_ignore_unrelated_bits(mxcsr: u32) {
            prop_assert_eq!(
                decode_rounding(mxcsr),
                decode_rounding(mxcsr & ROUNDING_FIELD)
            );
            prop_assert_eq!(
                decode_exception_mask(mxcsr),
                decode_exception_mask(mxcsr & EXCEPTION_MASK_FIELD)
            );
            prop_assert_eq!(
                decode_status(mxcsr),
                decode_status(mxcsr & STATUS_FIELD)
            );
        }
    }
}
