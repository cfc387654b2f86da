//! Backend drivers for the floating-point environment.
//!
//! Exactly one driver is compiled per build target; the register encodings
//! of the backends are mutually unintelligible (bit 10 masks overflow on the
//! 387 but sits inside the FPCR rounding field on NEON), so the choice is a
//! compile-time one and runtime dispatch would be meaningless. Selection
//! happens through the cfg aliases defined in `build.rs`.
//!
//! All platform intrinsics and inline assembly live behind the drivers in
//! this module; nothing else in the crate touches a raw register.

use std::fmt::Debug;

use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

/// Raw register access shared by the two x86 drivers.
#[cfg(x86_fpu)]
pub(crate) mod x86_raw;

/// Driver for the legacy x87 stack FPU, control via `fnstcw`/`fldcw`.
#[cfg(x87_backend)]
pub(crate) mod x87;

/// Driver for SSE via MXCSR, coordinating the 387 control word alongside it.
#[cfg(sse_backend)]
pub(crate) mod sse;

/// Driver for AArch64 NEON via FPCR/FPSR.
#[cfg(neon_backend)]
pub(crate) mod neon;

/// Driver over in-memory emulator state instead of hardware registers.
#[cfg(soft_backend)]
pub(crate) mod soft;

/// The uniform contract every backend driver satisfies.
///
/// All operations act on the floating-point state of the calling thread and
/// are infallible: no operation blocks, performs I/O, or has a runtime error
/// path. The "raise = mask" convention holds throughout:
/// [`raise_exception_mask`](FpuBackend::raise_exception_mask) *disables*
/// trapping of the given kinds, following the IEEE control-word convention
/// of a set mask bit meaning non-trapping.
pub trait FpuBackend {
    /// All environment state that must be restored to reproduce this
    /// backend's behaviour: rounding, exception masks and precision bits.
    /// Snapshots are only meaningful against the backend that produced them
    /// and must never be persisted outside the process.
    type Snapshot: Copy + Clone + PartialEq + Eq + Debug;

    /// Human-readable backend name, for logs.
    const NAME: &'static str;

    /// Mask (disable trapping of) the given exception kinds.
    fn raise_exception_mask(flags: ExceptionFlags);

    /// Re-enable trapping for the given exception kinds and clear their
    /// sticky status bits.
    fn clear_exception_mask(flags: ExceptionFlags);

    /// The set of currently masked exception kinds.
    fn masked_exceptions() -> ExceptionFlags;

    /// The sticky status flags of exceptions that have occurred since they
    /// were last cleared, independent of masking.
    fn raised_exceptions() -> ExceptionFlags;

    /// The active rounding mode.
    fn rounding_mode() -> RoundingMode;

    /// Select a rounding mode, leaving every other control bit untouched.
    fn set_rounding_mode(mode: RoundingMode);

    /// Capture the full environment.
    fn read_environment() -> Self::Snapshot;

    /// Restore a previously captured environment, rewriting every relevant
    /// bit rather than merging; stale register content from whatever ran on
    /// this thread before must not survive.
    fn write_environment(snapshot: Self::Snapshot);

    /// Capture the environment, then mask all exceptions and clear all
    /// sticky status flags, so a risky computation can run without trapping
    /// and be inspected afterwards.
    fn hold_exceptions() -> Self::Snapshot;

    /// Configure the internal working precision (a no-op on backends whose
    /// computed precision is inherent to the instruction, but idempotent and
    /// successful everywhere) and the backend's denormal handling.
    fn apply_profile(profile: PrecisionProfile);
}

cfg_if::cfg_if! {
    if #[cfg(soft_backend)] {
        pub(crate) use soft::SoftFloatDriver as ActiveDriver;
    } else if #[cfg(x87_backend)] {
        pub(crate) use x87::LegacyStackDriver as ActiveDriver;
    } else if #[cfg(sse_backend)] {
        pub(crate) use sse::SseDriver as ActiveDriver;
    } else if #[cfg(neon_backend)] {
        pub(crate) use neon::NeonDriver as ActiveDriver;
    } else {
        compile_error!(
            "no floating-point environment backend matches this target; \
             enable the `softfloat` feature to use the emulated backend"
        );
    }
}
