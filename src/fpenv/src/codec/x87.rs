//! Bit layout of the 387 FPU control and status words.
//!
//! Control word:
//!
//! ```text
//! Rsvd:Rsvd:Rsvd:X:RC:RC:PC:PC:Rsvd:Rsvd:PM:UM:OM:ZM:DM:IM
//!  15   14   13 12 11 10  9  8   7    6   5  4  3  2  1  0
//! ```
//!
//! where RC is rounding control, PC is precision control and the low six
//! bits mask (disable trapping of) their exception kind when set. The status
//! word carries the sticky exception bits in the same low-six layout.
//!
//! Source: Intel Architecture Software Developer's Manual, Volume 1.

use crate::error::{FpEnvError, Result};
use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

/// Exception mask field, bits 0..5. A set bit masks the exception.
pub const EXCEPTION_MASK_FIELD: u16 = 0x003F;
/// Precision control field, bits 8..9.
pub const PRECISION_FIELD: u16 = 0x0300;
/// Rounding control field, bits 10..11.
pub const ROUNDING_FIELD: u16 = 0x0C00;

/// PC encoding for 32-bit internal operations.
pub const PRECISION_SINGLE: u16 = 0x0000;
/// PC encoding reserved by the architecture.
pub const PRECISION_RESERVED: u16 = 0x0100;
/// PC encoding for 64-bit internal operations.
pub const PRECISION_DOUBLE: u16 = 0x0200;
/// PC encoding for 80-bit internal operations.
pub const PRECISION_EXTENDED: u16 = 0x0300;

/// Encode a rounding mode into the RC field.
pub fn encode_rounding(mode: RoundingMode) -> u16 {
    match mode {
        RoundingMode::ToNearest => 0x0000,
        RoundingMode::Downward => 0x0400,
        RoundingMode::Upward => 0x0800,
        RoundingMode::TowardZero => 0x0C00,
    }
}

/// Decode the RC field of a control word. Total: all four encodings are
/// valid rounding modes.
pub fn decode_rounding(word: u16) -> RoundingMode {
    match word & ROUNDING_FIELD {
        0x0000 => RoundingMode::ToNearest,
        0x0400 => RoundingMode::Downward,
        0x0800 => RoundingMode::Upward,
        _ => RoundingMode::TowardZero,
    }
}

/// Encode an exception set into the mask field. The semantic flag layout is
/// the 387 layout, so this is a plain projection.
pub fn encode_exception_mask(flags: ExceptionFlags) -> u16 {
    (flags.bits() as u16) & EXCEPTION_MASK_FIELD
}

/// Decode the mask field of a control word.
pub fn decode_exception_mask(word: u16) -> ExceptionFlags {
    ExceptionFlags::from_bits_truncate(u32::from(word & EXCEPTION_MASK_FIELD))
}

/// Decode the sticky exception bits of a status word; they share the mask
/// field layout.
pub fn decode_status(word: u16) -> ExceptionFlags {
    decode_exception_mask(word)
}

/// Encode a precision profile into the PC field.
pub fn encode_precision(profile: PrecisionProfile) -> u16 {
    match profile {
        PrecisionProfile::Simple => PRECISION_SINGLE,
        PrecisionProfile::Double => PRECISION_DOUBLE,
        #[cfg(x87_backend)]
        PrecisionProfile::Extended => PRECISION_EXTENDED,
    }
}

/// Decode the PC field of a control word.
///
/// Fails on the reserved `0b01` encoding, and on the 80-bit encoding in
/// builds whose backend has no `Extended` profile (the ambient control word
/// of most hosts defaults to 80-bit internal precision).
pub fn decode_precision(word: u16) -> Result<PrecisionProfile> {
    match word & PRECISION_FIELD {
        PRECISION_SINGLE => Ok(PrecisionProfile::Simple),
        PRECISION_DOUBLE => Ok(PrecisionProfile::Double),
        #[cfg(x87_backend)]
        PRECISION_EXTENDED => Ok(PrecisionProfile::Extended),
        #[cfg(not(x87_backend))]
        PRECISION_EXTENDED => Err(FpEnvError::ExtendedPrecisionUnavailable),
        _ => Err(FpEnvError::ReservedPrecisionControl(0b01)),
    }
}
