//! Uniform control of the floating-point environment (rounding mode,
//! exception masks and internal working precision) across the legacy x87
//! stack FPU, SSE/MXCSR, AArch64 NEON and a software-emulated unit, so that
//! every machine in a lockstep-synchronised simulation produces bit-identical
//! arithmetic.
//!
//! Exactly one backend is compiled per build target (see `build.rs`); the
//! four register layouts are mutually unintelligible, so the choice is never
//! a runtime one. A worker thread applies a [`PrecisionProfile`] once at
//! start-up, and may adjust rounding or exception masking at any point:
//!
//! ```
//! use fpenv::{PrecisionProfile, RoundingMode};
//!
//! fpenv::apply_profile(PrecisionProfile::Double);
//! fpenv::set_rounding_mode(RoundingMode::ToNearest);
//!
//! let sum = std::hint::black_box(0.1f64) + std::hint::black_box(0.2f64);
//! assert_eq!(sum.to_bits(), 0x3FD3_3333_3333_3334);
//!
//! fpenv::restore_default_environment();
//! ```
//!
//! The first operation a thread performs through this crate captures that
//! thread's ambient environment before changing anything, so whatever the
//! host runtime configured beforehand stays recoverable through
//! [`default_environment`] and [`restore_default_environment`].
//!
//! # Determinism prerequisite
//!
//! Floating-point control registers are thread-local hardware state. The
//! guarantees here are exactly as strong as the host's guarantee to save and
//! restore FPU registers across context switches and thread migration; every
//! mainstream OS does, but this crate assumes it rather than enforcing it.

/// Backend drivers and the capability trait they satisfy.
pub(crate) mod backend;
/// Pure bit-layout knowledge for each native control register.
#[deny(missing_docs)]
pub mod codec;
/// Environment snapshots, the default-environment cache and the public
/// get/set surface.
pub(crate) mod env;
/// Errors that can arise when inspecting ambient register state.
pub(crate) mod error;
/// The semantic data model: rounding modes, exception flags, precision
/// profiles.
pub(crate) mod flags;
/// Per-thread precision profile initialisation.
pub(crate) mod profile;

pub use backend::FpuBackend;
pub use env::{
    clear_exception_mask, default_environment, environment, hold_exceptions, is_masked,
    masked_exceptions, raise_exception_mask, raised_exceptions, restore_default_environment,
    rounding_mode, set_environment, set_rounding_mode, EnvironmentSnapshot, ExceptionHold,
};
pub use error::{FpEnvError, Result};
pub use flags::{ExceptionFlags, PrecisionProfile, RoundingMode};
pub use profile::apply_profile;

/// The name of the backend compiled into this build.
pub fn backend_name() -> &'static str {
    use backend::ActiveDriver;
    ActiveDriver::NAME
}
