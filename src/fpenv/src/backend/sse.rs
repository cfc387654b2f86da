//! The SSE driver.
//!
//! MXCSR is authoritative for rounding, masking and sticky status, but the
//! 387 control word is kept coordinated for exception masking and precision:
//! compilers may still emit legacy-stack instructions (long double,
//! 32-bit ABI returns) and those must not trap either. Denormal handling is
//! this backend's extra concern: flush-to-zero and denormals-are-zero are
//! configured during profile application.

use super::{x86_raw, FpuBackend};
use crate::codec::{mxcsr, x87};
use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

/// Environment snapshot of the SSE backend: both coordinated registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SseSnapshot {
    pub(crate) mxcsr: u32,
    pub(crate) control_word: u16,
}

pub(crate) struct SseDriver;

impl FpuBackend for SseDriver {
    type Snapshot = SseSnapshot;

    const NAME: &'static str = "sse";

    fn raise_exception_mask(flags: ExceptionFlags) {
        let cw = x86_raw::read_control_word();
        x86_raw::write_control_word(cw | x87::encode_exception_mask(flags));

        let csr = x86_raw::read_mxcsr();
        x86_raw::write_mxcsr(csr | mxcsr::encode_exception_mask(flags));
    }

    fn clear_exception_mask(flags: ExceptionFlags) {
        // Sticky bits go first so a re-enabled trap cannot fire from a
        // stale flag.
        x86_raw::clear_pending_exceptions();
        let cw = x86_raw::read_control_word();
        x86_raw::write_control_word(cw & !x87::encode_exception_mask(flags));

        let csr = x86_raw::read_mxcsr()
            & !mxcsr::encode_exception_mask(flags)
            & !mxcsr::encode_status(flags);
        x86_raw::write_mxcsr(csr);
    }

    fn masked_exceptions() -> ExceptionFlags {
        mxcsr::decode_exception_mask(x86_raw::read_mxcsr())
    }

    fn raised_exceptions() -> ExceptionFlags {
        // Union of both status registers, in case legacy-stack instructions
        // were emitted alongside SSE arithmetic.
        mxcsr::decode_status(x86_raw::read_mxcsr())
            | x87::decode_status(x86_raw::read_status_word())
    }

    fn rounding_mode() -> RoundingMode {
        mxcsr::decode_rounding(x86_raw::read_mxcsr())
    }

    fn set_rounding_mode(mode: RoundingMode) {
        let csr = x86_raw::read_mxcsr() & !mxcsr::ROUNDING_FIELD;
        x86_raw::write_mxcsr(csr | mxcsr::encode_rounding(mode));
    }

    fn read_environment() -> SseSnapshot {
        SseSnapshot {
            mxcsr: x86_raw::read_mxcsr(),
            control_word: x86_raw::read_control_word(),
        }
    }

    fn write_environment(snapshot: SseSnapshot) {
        x86_raw::write_control_word(snapshot.control_word);
        x86_raw::write_mxcsr(snapshot.mxcsr);
    }

    fn hold_exceptions() -> SseSnapshot {
        let snapshot = Self::read_environment();
        x86_raw::clear_pending_exceptions();
        x86_raw::write_control_word(
            snapshot.control_word | x87::encode_exception_mask(ExceptionFlags::all()),
        );
        let csr = (snapshot.mxcsr | mxcsr::EXCEPTION_MASK_FIELD) & !mxcsr::STATUS_FIELD;
        x86_raw::write_mxcsr(csr);
        snapshot
    }

    fn apply_profile(profile: PrecisionProfile) {
        // Internal precision is a 387 concern even on this backend.
        let cw = x86_raw::read_control_word() & !x87::PRECISION_FIELD;
        x86_raw::write_control_word(cw | x87::encode_precision(profile));

        let csr = x86_raw::read_mxcsr();
        if cfg!(feature = "no-denormals") {
            x86_raw::write_mxcsr(csr | mxcsr::FTZ | mxcsr::DAZ);
        } else {
            // The ambient default captured on first use may have either bit
            // set; clear both explicitly.
            x86_raw::write_mxcsr(csr & !(mxcsr::FTZ | mxcsr::DAZ));
        }

        #[cfg(feature = "support-snan")]
        Self::raise_exception_mask(
            ExceptionFlags::INVALID | ExceptionFlags::DIV_BY_ZERO | ExceptionFlags::OVERFLOW,
        );
    }
}
