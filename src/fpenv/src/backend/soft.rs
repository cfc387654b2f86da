//! The software-emulated driver.
//!
//! Instead of hardware registers, the environment lives in in-memory state
//! local to the calling thread, with the exact same contract: raise = mask,
//! sticky-until-cleared status flags, whole-state save/restore. An attached
//! float emulator is expected to consult [`current`] before rounding and to
//! report outcomes through [`record_raised`].

use std::cell::Cell;

use super::FpuBackend;
use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

/// How the emulator detects tininess on underflow. Hardware fixes this per
/// architecture; the emulator keeps it as restorable state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TininessDetection {
    BeforeRounding,
    AfterRounding,
}

/// Environment snapshot of the software backend: the whole emulator state,
/// sticky flags included.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SoftSnapshot {
    pub(crate) rounding: RoundingMode,
    pub(crate) tininess: TininessDetection,
    pub(crate) masked: ExceptionFlags,
    pub(crate) raised: ExceptionFlags,
}

impl SoftSnapshot {
    const DEFAULT: SoftSnapshot = SoftSnapshot {
        rounding: RoundingMode::ToNearest,
        tininess: TininessDetection::AfterRounding,
        masked: ExceptionFlags::all(),
        raised: ExceptionFlags::empty(),
    };
}

thread_local! {
    static STATE: Cell<SoftSnapshot> = const { Cell::new(SoftSnapshot::DEFAULT) };
}

fn update(f: impl FnOnce(&mut SoftSnapshot)) {
    STATE.with(|state| {
        let mut env = state.get();
        f(&mut env);
        state.set(env);
    });
}

/// The emulator state of the calling thread.
pub(crate) fn current() -> SoftSnapshot {
    STATE.with(Cell::get)
}

/// Record sticky exception outcomes from an emulated operation.
pub(crate) fn record_raised(flags: ExceptionFlags) {
    update(|env| env.raised |= flags);
}

pub(crate) struct SoftFloatDriver;

impl FpuBackend for SoftFloatDriver {
    type Snapshot = SoftSnapshot;

    const NAME: &'static str = "softfloat";

    fn raise_exception_mask(flags: ExceptionFlags) {
        update(|env| env.masked |= flags);
    }

    fn clear_exception_mask(flags: ExceptionFlags) {
        update(|env| {
            env.masked -= flags;
            env.raised -= flags;
        });
    }

    fn masked_exceptions() -> ExceptionFlags {
        current().masked
    }

    fn raised_exceptions() -> ExceptionFlags {
        current().raised
    }

    fn rounding_mode() -> RoundingMode {
        current().rounding
    }

    fn set_rounding_mode(mode: RoundingMode) {
        update(|env| env.rounding = mode);
    }

    fn read_environment() -> SoftSnapshot {
        current()
    }

    fn write_environment(snapshot: SoftSnapshot) {
        STATE.with(|state| state.set(snapshot));
    }

    fn hold_exceptions() -> SoftSnapshot {
        let snapshot = current();
        update(|env| {
            env.masked = ExceptionFlags::all();
            env.raised = ExceptionFlags::empty();
        });
        snapshot
    }

    fn apply_profile(_profile: PrecisionProfile) {
        // Computed precision is whichever emulated operation the caller
        // picks; nothing to configure, but the call must stay idempotent.

        #[cfg(feature = "support-snan")]
        Self::raise_exception_mask(
            ExceptionFlags::INVALID | ExceptionFlags::DIV_BY_ZERO | ExceptionFlags::OVERFLOW,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn rounding_mode_round_trips() {
        let saved = SoftFloatDriver::read_environment();
        for mode in RoundingMode::iter() {
            SoftFloatDriver::set_rounding_mode(mode);
            assert_eq!(SoftFloatDriver::rounding_mode(), mode);
        }
        SoftFloatDriver::write_environment(saved);
    }

    #[test]
    fn sticky_flags_survive_until_cleared() {
        let saved = SoftFloatDriver::read_environment();
        record_raised(ExceptionFlags::DIV_BY_ZERO);
        assert!(SoftFloatDriver::raised_exceptions().contains(ExceptionFlags::DIV_BY_ZERO));
        // Masking state does not touch stickiness.
        SoftFloatDriver::raise_exception_mask(ExceptionFlags::DIV_BY_ZERO);
        assert!(SoftFloatDriver::raised_exceptions().contains(ExceptionFlags::DIV_BY_ZERO));
        SoftFloatDriver::clear_exception_mask(ExceptionFlags::DIV_BY_ZERO);
        assert!(!SoftFloatDriver::raised_exceptions().contains(ExceptionFlags::DIV_BY_ZERO));
        SoftFloatDriver::write_environment(saved);
    }

    #[test]
    fn hold_captures_and_clears_everything() {
        let saved = SoftFloatDriver::read_environment();
        SoftFloatDriver::set_rounding_mode(RoundingMode::Upward);
        SoftFloatDriver::clear_exception_mask(ExceptionFlags::INEXACT);
        record_raised(ExceptionFlags::OVERFLOW);
        let held = SoftFloatDriver::hold_exceptions();
        assert_eq!(SoftFloatDriver::masked_exceptions(), ExceptionFlags::all());
        assert_eq!(SoftFloatDriver::raised_exceptions(), ExceptionFlags::empty());
        SoftFloatDriver::write_environment(held);
        assert_eq!(SoftFloatDriver::rounding_mode(), RoundingMode::Upward);
        assert!(!SoftFloatDriver::masked_exceptions().contains(ExceptionFlags::INEXACT));
        assert!(SoftFloatDriver::raised_exceptions().contains(ExceptionFlags::OVERFLOW));
        SoftFloatDriver::write_environment(saved);
    }

    #[test]
    fn state_is_thread_local() {
        SoftFloatDriver::set_rounding_mode(RoundingMode::TowardZero);
        let other = std::thread::spawn(|| SoftFloatDriver::rounding_mode())
            .join()
            .unwrap();
        assert_eq!(other, RoundingMode::ToNearest);
        SoftFloatDriver::set_rounding_mode(RoundingMode::ToNearest);
    }
}
