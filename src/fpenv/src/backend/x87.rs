//! The legacy x87 stack FPU driver.
//!
//! All state lives in the 387 control word; the status word is read-only
//! here apart from `fnclex`. Reads use the no-wait instruction forms and are
//! side-effect-free on the numeric stack. This is the only backend with a
//! precision-control field wide enough for 80-bit internal operations.

use super::{x86_raw, FpuBackend};
use crate::codec::x87;
use crate::flags::{ExceptionFlags, PrecisionProfile, RoundingMode};

/// Environment snapshot of the legacy stack backend: the control word holds
/// every bit this driver manages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct X87Snapshot {
    pub(crate) control_word: u16,
}

pub(crate) struct LegacyStackDriver;

impl FpuBackend for LegacyStackDriver {
    type Snapshot = X87Snapshot;

    const NAME: &'static str = "x87";

    fn raise_exception_mask(flags: ExceptionFlags) {
        let cw = x86_raw::read_control_word();
        x86_raw::write_control_word(cw | x87::encode_exception_mask(flags));
    }

    fn clear_exception_mask(flags: ExceptionFlags) {
        // Pending flags must go before unmasking: a stale sticky bit whose
        // trap is re-enabled would fire on the next waiting instruction.
        x86_raw::clear_pending_exceptions();
        let cw = x86_raw::read_control_word();
        x86_raw::write_control_word(cw & !x87::encode_exception_mask(flags));
    }

    fn masked_exceptions() -> ExceptionFlags {
        x87::decode_exception_mask(x86_raw::read_control_word())
    }

    fn raised_exceptions() -> ExceptionFlags {
        x87::decode_status(x86_raw::read_status_word())
    }

    fn rounding_mode() -> RoundingMode {
        x87::decode_rounding(x86_raw::read_control_word())
    }

    fn set_rounding_mode(mode: RoundingMode) {
        let cw = x86_raw::read_control_word() & !x87::ROUNDING_FIELD;
        x86_raw::write_control_word(cw | x87::encode_rounding(mode));
    }

    fn read_environment() -> X87Snapshot {
        X87Snapshot {
            control_word: x86_raw::read_control_word(),
        }
    }

    fn write_environment(snapshot: X87Snapshot) {
        x86_raw::write_control_word(snapshot.control_word);
    }

    fn hold_exceptions() -> X87Snapshot {
        let snapshot = Self::read_environment();
        x86_raw::clear_pending_exceptions();
        x86_raw::write_control_word(
            snapshot.control_word | x87::encode_exception_mask(ExceptionFlags::all()),
        );
        snapshot
    }

    fn apply_profile(profile: PrecisionProfile) {
        let cw = x86_raw::read_control_word() & !x87::PRECISION_FIELD;
        x86_raw::write_control_word(cw | x87::encode_precision(profile));

        #[cfg(feature = "support-snan")]
        Self::raise_exception_mask(
            ExceptionFlags::INVALID | ExceptionFlags::DIV_BY_ZERO | ExceptionFlags::OVERFLOW,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use strum::IntoEnumIterator;

    #[test]
    #[serial]
    fn rounding_mode_round_trips() {
        let saved = LegacyStackDriver::read_environment();
        for mode in RoundingMode::iter() {
            LegacyStackDriver::set_rounding_mode(mode);
            assert_eq!(LegacyStackDriver::rounding_mode(), mode);
        }
        LegacyStackDriver::write_environment(saved);
    }

    #[test]
    #[serial]
    fn exception_masks_round_trip() {
        let saved = LegacyStackDriver::read_environment();
        for bits in 0..=ExceptionFlags::all().bits() {
            let Some(flags) = ExceptionFlags::from_bits(bits) else {
                continue;
            };
            LegacyStackDriver::raise_exception_mask(flags);
            assert!(LegacyStackDriver::masked_exceptions().contains(flags));
        }
        LegacyStackDriver::write_environment(saved);
    }

    #[test]
    #[serial]
    fn snapshot_restore_is_idempotent() {
        let first = LegacyStackDriver::read_environment();
        LegacyStackDriver::write_environment(first);
        let second = LegacyStackDriver::read_environment();
        assert_eq!(first, second);
        LegacyStackDriver::write_environment(first);
    }

    #[test]
    #[serial]
    fn hold_masks_everything_and_restore_undoes_it() {
        let saved = LegacyStackDriver::read_environment();
        LegacyStackDriver::set_rounding_mode(RoundingMode::Upward);
        let held = LegacyStackDriver::hold_exceptions();
        assert_eq!(LegacyStackDriver::masked_exceptions(), ExceptionFlags::all());
        assert_eq!(LegacyStackDriver::raised_exceptions(), ExceptionFlags::empty());
        LegacyStackDriver::write_environment(held);
        assert_eq!(LegacyStackDriver::rounding_mode(), RoundingMode::Upward);
        LegacyStackDriver::write_environment(saved);
    }

    #[test]
    #[serial]
    fn profile_application_is_idempotent() {
        let saved = LegacyStackDriver::read_environment();
        LegacyStackDriver::apply_profile(PrecisionProfile::Double);
        let once = LegacyStackDriver::read_environment();
        LegacyStackDriver::apply_profile(PrecisionProfile::Double);
        assert_eq!(LegacyStackDriver::read_environment(), once);
        LegacyStackDriver::write_environment(saved);
    }

    #[test]
    #[serial]
    fn extended_precision_is_available_here() {
        let saved = LegacyStackDriver::read_environment();
        LegacyStackDriver::apply_profile(PrecisionProfile::Extended);
        let cw = LegacyStackDriver::read_environment().control_word;
        assert_eq!(
            cw & crate::codec::x87::PRECISION_FIELD,
            crate::codec::x87::PRECISION_EXTENDED
        );
        LegacyStackDriver::write_environment(saved);
    }
}
