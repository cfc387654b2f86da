//! Default-environment capture, verified against out-of-band register reads
//! that never go through the library.

use fpenv::{PrecisionProfile, RoundingMode};

#[cfg(sse_backend)]
#[test]
fn first_touch_captures_the_preexisting_state() {
    // A fresh thread owns its whole capture lifecycle; the status bits are
    // excluded from the comparison because unrelated arithmetic in the
    // harness may legitimately set them.
    std::thread::spawn(|| {
        let control = !fpenv::codec::mxcsr::STATUS_FIELD;
        let before = fpenv_testing::ambient_mxcsr() & control;

        fpenv::apply_profile(PrecisionProfile::Double);
        fpenv::set_rounding_mode(RoundingMode::TowardZero);
        fpenv::raise_exception_mask(fpenv::ExceptionFlags::all());

        fpenv::restore_default_environment();
        let after = fpenv_testing::ambient_mxcsr() & control;
        assert_eq!(after, before);
    })
    .join()
    .unwrap();
}

#[cfg(neon_backend)]
#[test]
fn first_touch_captures_the_preexisting_state() {
    std::thread::spawn(|| {
        let before = fpenv_testing::ambient_fpcr();

        fpenv::apply_profile(PrecisionProfile::Double);
        fpenv::set_rounding_mode(RoundingMode::TowardZero);

        fpenv::restore_default_environment();
        assert_eq!(fpenv_testing::ambient_fpcr(), before);
    })
    .join()
    .unwrap();
}

#[cfg(x87_backend)]
#[test]
fn first_touch_captures_the_preexisting_state() {
    std::thread::spawn(|| {
        let before = fpenv_testing::ambient_x87_control_word();

        fpenv::apply_profile(PrecisionProfile::Extended);
        fpenv::set_rounding_mode(RoundingMode::Upward);

        fpenv::restore_default_environment();
        assert_eq!(fpenv_testing::ambient_x87_control_word(), before);
    })
    .join()
    .unwrap();
}

#[test]
fn default_survives_library_writes() {
    std::thread::spawn(|| {
        let ambient = fpenv::default_environment();
        fpenv::apply_profile(PrecisionProfile::Double);
        fpenv::set_rounding_mode(RoundingMode::Downward);
        assert_eq!(fpenv::default_environment(), ambient);
    })
    .join()
    .unwrap();
}
