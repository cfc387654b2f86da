//! Bit layout of the AArch64 FPCR and FPSR registers.
//!
//! FPCR (control):
//!
//! ```text
//! Rsvd:AHP:DN:FZ:RMode:Stride:FZ16: Len :IDE:Rsvd:EBF:IXE:UFE:OFE:DZE:IOE:...
//! 63-27  26 25 24 23-22  21-20   19 18-16  15  14   13  12  11  10  9   8
//! ```
//!
//! Two inversions versus the x86 registers are absorbed here: the per-kind
//! bits are trap *enables* (a set bit traps, a clear bit masks), and the
//! directed rounding modes are ordered differently inside RMode (`0b01` is
//! upward, `0b10` is downward). FPSR carries the sticky exception bits.
//!
//! Source: Arm Architecture Reference Manual for A-profile, FPCR/FPSR.

use crate::flags::{ExceptionFlags, RoundingMode};

/// Rounding mode field (RMode), bits 22..23.
pub const ROUNDING_FIELD: u64 = 0b11 << 22;
/// Flush-to-zero mode.
pub const FZ: u64 = 1 << 24;

/// Per-kind trap enable bits, IOE..IXE. None of these set means every
/// exception is masked.
pub const TRAP_ENABLE_FIELD: u64 = 0b11111 << 8;
/// Sticky status bits of FPSR, IOC..IXC.
pub const STATUS_FIELD: u64 = 0b11111;

const TRAP_ENABLE_BITS: [(ExceptionFlags, u64); 5] = [
    (ExceptionFlags::INVALID, 1 << 8),
    (ExceptionFlags::DIV_BY_ZERO, 1 << 9),
    (ExceptionFlags::OVERFLOW, 1 << 10),
    (ExceptionFlags::UNDERFLOW, 1 << 11),
    (ExceptionFlags::INEXACT, 1 << 12),
];

const STATUS_BITS: [(ExceptionFlags, u64); 5] = [
    (ExceptionFlags::INVALID, 1 << 0),
    (ExceptionFlags::DIV_BY_ZERO, 1 << 1),
    (ExceptionFlags::OVERFLOW, 1 << 2),
    (ExceptionFlags::UNDERFLOW, 1 << 3),
    (ExceptionFlags::INEXACT, 1 << 4),
];

/// Encode a rounding mode into the RMode field.
pub fn encode_rounding(mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::ToNearest => 0b00 << 22,
        RoundingMode::Upward => 0b01 << 22,
        RoundingMode::Downward => 0b10 << 22,
        RoundingMode::TowardZero => 0b11 << 22,
    }
}

/// Decode the RMode field. Total: all four encodings are valid.
pub fn decode_rounding(fpcr: u64) -> RoundingMode {
    match fpcr & ROUNDING_FIELD {
        0 => RoundingMode::ToNearest,
        x if x == 0b01 << 22 => RoundingMode::Upward,
        x if x == 0b10 << 22 => RoundingMode::Downward,
        _ => RoundingMode::TowardZero,
    }
}

/// Encode a *masked* exception set into the trap-enable field, inverting
/// into the clear-bit-means-masked convention of FPCR.
pub fn encode_masked(masked: ExceptionFlags) -> u64 {
    let mut bits = 0;
    for (flag, trap_bit) in TRAP_ENABLE_BITS {
        if !masked.contains(flag) {
            bits |= trap_bit;
        }
    }
    bits
}

/// Decode the trap-enable field into the set of masked exceptions.
pub fn decode_masked(fpcr: u64) -> ExceptionFlags {
    let mut masked = ExceptionFlags::empty();
    for (flag, trap_bit) in TRAP_ENABLE_BITS {
        if fpcr & trap_bit == 0 {
            masked |= flag;
        }
    }
    masked
}

/// Encode an exception set into the FPSR sticky status bits.
pub fn encode_status(flags: ExceptionFlags) -> u64 {
    let mut bits = 0;
    for (flag, status_bit) in STATUS_BITS {
        if flags.contains(flag) {
            bits |= status_bit;
        }
    }
    bits
}

/// Decode the FPSR sticky status bits.
pub fn decode_status(fpsr: u64) -> ExceptionFlags {
    let mut flags = ExceptionFlags::empty();
    for (flag, status_bit) in STATUS_BITS {
        if fpsr & status_bit != 0 {
            flags |= flag;
        }
    }
    flags
}
