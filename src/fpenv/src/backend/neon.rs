//! The AArch64 NEON driver, over FPCR (control) and FPSR (status).
//!
//! There is no precision-control concept on this backend: computed precision
//! is inherent to the instruction chosen, so that part of profile
//! application is a successful no-op. Flush-to-zero lives in FPCR.FZ.
//!
//! A hardware caveat: the per-kind trap-enable bits (IOE..IXE) are optional
//! in the architecture and read-as-zero on many cores, which leaves every
//! exception permanently masked there. Masking state round-trips are only
//! observable on cores that implement trapping.

use super::FpuBackend;
use crate::codec::fpcr;
use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

mod raw {
    use std::arch::asm;

    pub(super) fn read_fpcr() -> u64 {
        let bits: u64;
        unsafe {
            asm!("mrs {}, fpcr", out(reg) bits, options(nomem, nostack, preserves_flags));
        }
        bits
    }

    pub(super) fn write_fpcr(bits: u64) {
        unsafe {
            asm!("msr fpcr, {}", in(reg) bits, options(nomem, nostack, preserves_flags));
        }
    }

    pub(super) fn read_fpsr() -> u64 {
        let bits: u64;
        unsafe {
            asm!("mrs {}, fpsr", out(reg) bits, options(nomem, nostack, preserves_flags));
        }
        bits
    }

    pub(super) fn write_fpsr(bits: u64) {
        unsafe {
            asm!("msr fpsr, {}", in(reg) bits, options(nomem, nostack, preserves_flags));
        }
    }
}

/// Environment snapshot of the NEON backend: FPCR holds every control bit
/// this driver manages; sticky status stays in FPSR and is not part of the
/// restorable environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NeonSnapshot {
    pub(crate) fpcr: u64,
}

pub(crate) struct NeonDriver;

impl NeonDriver {
    fn set_masked(masked: ExceptionFlags) {
        let bits = raw::read_fpcr() & !fpcr::TRAP_ENABLE_FIELD;
        raw::write_fpcr(bits | fpcr::encode_masked(masked));
    }
}

impl FpuBackend for NeonDriver {
    type Snapshot = NeonSnapshot;

    const NAME: &'static str = "neon";

    fn raise_exception_mask(flags: ExceptionFlags) {
        Self::set_masked(Self::masked_exceptions() | flags);
    }

    fn clear_exception_mask(flags: ExceptionFlags) {
        raw::write_fpsr(raw::read_fpsr() & !fpcr::encode_status(flags));
        Self::set_masked(Self::masked_exceptions() - flags);
    }

    fn masked_exceptions() -> ExceptionFlags {
        fpcr::decode_masked(raw::read_fpcr())
    }

    fn raised_exceptions() -> ExceptionFlags {
        fpcr::decode_status(raw::read_fpsr())
    }

    fn rounding_mode() -> RoundingMode {
        fpcr::decode_rounding(raw::read_fpcr())
    }

    fn set_rounding_mode(mode: RoundingMode) {
        let bits = raw::read_fpcr() & !fpcr::ROUNDING_FIELD;
        raw::write_fpcr(bits | fpcr::encode_rounding(mode));
    }

    fn read_environment() -> NeonSnapshot {
        NeonSnapshot {
            fpcr: raw::read_fpcr(),
        }
    }

    fn write_environment(snapshot: NeonSnapshot) {
        raw::write_fpcr(snapshot.fpcr);
    }

    fn hold_exceptions() -> NeonSnapshot {
        let snapshot = Self::read_environment();
        raw::write_fpsr(raw::read_fpsr() & !fpcr::STATUS_FIELD);
        raw::write_fpcr(snapshot.fpcr & !fpcr::TRAP_ENABLE_FIELD);
        snapshot
    }

    fn apply_profile(_profile: PrecisionProfile) {
        // No precision-width bits to configure; denormal handling is still
        // this backend's to manage.
        let bits = raw::read_fpcr();
        if cfg!(feature = "no-denormals") {
            raw::write_fpcr(bits | fpcr::FZ);
        } else {
            raw::write_fpcr(bits & !fpcr::FZ);
        }

        #[cfg(feature = "support-snan")]
        Self::raise_exception_mask(
            ExceptionFlags::INVALID | ExceptionFlags::DIV_BY_ZERO | ExceptionFlags::OVERFLOW,
        );
    }
}
