//! The public environment operations, the per-thread default-environment
//! cache, and the scoped exception hold.
//!
//! Every operation here acts on the floating-point state of the calling
//! thread only and completes in a bounded number of register accesses; there
//! is nothing to lock and nothing that can fail at runtime.

use once_cell::unsync::OnceCell;
use tracing::{instrument, Span};

use crate::backend::{ActiveDriver, FpuBackend};
use crate::flags::{ExceptionFlags, RoundingMode};

/// An opaque capture of all floating-point environment state that must be
/// restored: rounding mode, exception masks and precision bits, in whatever
/// register layout the active backend uses.
///
/// Snapshots are only comparable against snapshots from the same backend in
/// the same process; they are deliberately not serialisable and must never
/// be persisted to storage or the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentSnapshot(pub(crate) <ActiveDriver as FpuBackend>::Snapshot);

#[cfg(x86_fpu)]
impl EnvironmentSnapshot {
    /// Decode the internal-precision field of this snapshot.
    ///
    /// Fails when the ambient control word holds the reserved precision
    /// encoding, or selects 80-bit precision in a build without the
    /// `Extended` profile; both can genuinely appear in a freshly captured
    /// default environment the host configured before this library ran.
    pub fn precision(&self) -> crate::error::Result<crate::flags::PrecisionProfile> {
        crate::codec::x87::decode_precision(self.0.control_word)
    }
}

thread_local! {
    // "The environment this thread had before the library touched it."
    // Populated at most once, before the first write a thread performs
    // through this crate, and read-only afterwards.
    static DEFAULT_ENV: OnceCell<EnvironmentSnapshot> = const { OnceCell::new() };
}

/// Capture the ambient environment of this thread if not already captured,
/// and return the captured default.
pub(crate) fn capture_default() -> EnvironmentSnapshot {
    DEFAULT_ENV.with(|cell| {
        *cell.get_or_init(|| {
            let snapshot = EnvironmentSnapshot(ActiveDriver::read_environment());
            log::debug!(
                "captured ambient floating-point environment ({} backend): {:?}",
                ActiveDriver::NAME,
                snapshot
            );
            snapshot
        })
    })
}

/// Mask (disable trapping of) the given exception kinds. A masked operation
/// substitutes the defined IEEE result (infinity, NaN or zero) instead of
/// interrupting execution.
#[instrument(parent = Span::current(), level = "Trace")]
pub fn raise_exception_mask(flags: ExceptionFlags) {
    capture_default();
    ActiveDriver::raise_exception_mask(flags);
}

/// Re-enable trapping for the given exception kinds and clear their sticky
/// status flags. On the legacy stack backend sticky clearing is
/// whole-register; the hardware offers nothing finer.
#[instrument(parent = Span::current(), level = "Trace")]
pub fn clear_exception_mask(flags: ExceptionFlags) {
    capture_default();
    ActiveDriver::clear_exception_mask(flags);
}

/// Whether every exception kind in `flags` is currently masked.
pub fn is_masked(flags: ExceptionFlags) -> bool {
    capture_default();
    ActiveDriver::masked_exceptions().contains(flags)
}

/// The set of currently masked exception kinds.
pub fn masked_exceptions() -> ExceptionFlags {
    capture_default();
    ActiveDriver::masked_exceptions()
}

/// The sticky status flags of exceptions that occurred since they were last
/// cleared, independent of masking.
pub fn raised_exceptions() -> ExceptionFlags {
    capture_default();
    ActiveDriver::raised_exceptions()
}

/// The active rounding mode of this thread.
pub fn rounding_mode() -> RoundingMode {
    capture_default();
    ActiveDriver::rounding_mode()
}

/// Select the rounding mode for this thread.
#[instrument(parent = Span::current(), level = "Trace")]
pub fn set_rounding_mode(mode: RoundingMode) {
    capture_default();
    ActiveDriver::set_rounding_mode(mode);
}

/// Capture the full environment of this thread.
#[instrument(skip_all, parent = Span::current(), level = "Trace")]
pub fn environment() -> EnvironmentSnapshot {
    capture_default();
    EnvironmentSnapshot(ActiveDriver::read_environment())
}

/// Restore a previously captured environment, rewriting every relevant
/// register bit.
#[instrument(skip_all, parent = Span::current(), level = "Trace")]
pub fn set_environment(snapshot: EnvironmentSnapshot) {
    capture_default();
    ActiveDriver::write_environment(snapshot.0);
}

/// Capture the environment, then mask all exceptions and clear all sticky
/// status flags.
///
/// Callers must pair this with a later [`set_environment`] of the returned
/// snapshot, on early-exit paths included, or the thread's floating-point
/// behaviour silently diverges from its intended profile for the rest of its
/// life. [`ExceptionHold`] does the pairing automatically.
#[instrument(skip_all, parent = Span::current(), level = "Trace")]
pub fn hold_exceptions() -> EnvironmentSnapshot {
    capture_default();
    EnvironmentSnapshot(ActiveDriver::hold_exceptions())
}

/// The environment this thread had before the library first touched it.
pub fn default_environment() -> EnvironmentSnapshot {
    capture_default()
}

/// Restore the environment this thread had before the library first touched
/// it. On a thread the library never wrote to, this is a no-op.
#[instrument(skip_all, parent = Span::current(), level = "Trace")]
pub fn restore_default_environment() {
    let default = capture_default();
    ActiveDriver::write_environment(default.0);
}

/// Scoped exception-safe computation: captures and clears the environment on
/// creation, restores it on drop.
///
/// ```
/// let hold = fpenv::ExceptionHold::new();
/// // ... risky computation, nothing traps ...
/// let occurred = hold.raised();
/// drop(hold); // exact pre-hold state restored
/// # let _ = occurred;
/// ```
#[derive(Debug)]
pub struct ExceptionHold {
    saved: EnvironmentSnapshot,
}

impl ExceptionHold {
    /// Capture the current environment, mask all exceptions and clear all
    /// sticky flags.
    pub fn new() -> Self {
        Self {
            saved: hold_exceptions(),
        }
    }

    /// The environment that will be restored on drop.
    pub fn saved(&self) -> EnvironmentSnapshot {
        self.saved
    }

    /// The sticky flags accumulated since the hold began.
    pub fn raised(&self) -> ExceptionFlags {
        raised_exceptions()
    }
}

impl Default for ExceptionHold {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExceptionHold {
    fn drop(&mut self) {
        set_environment(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn snapshot_idempotence() {
        let saved = environment();
        set_environment(saved);
        assert_eq!(environment(), saved);
    }

    #[test]
    #[serial]
    fn hold_then_restore_recovers_mask_and_rounding() {
        let saved = environment();
        set_rounding_mode(RoundingMode::Downward);
        raise_exception_mask(ExceptionFlags::all());
        let held = hold_exceptions();
        assert!(is_masked(ExceptionFlags::all()));
        set_environment(held);
        assert_eq!(rounding_mode(), RoundingMode::Downward);
        assert!(is_masked(ExceptionFlags::all()));
        set_environment(saved);
    }

    #[test]
    #[serial]
    fn exception_hold_restores_on_drop() {
        let saved = environment();
        set_rounding_mode(RoundingMode::TowardZero);
        let before = environment();
        {
            let hold = ExceptionHold::new();
            assert_eq!(hold.saved(), before);
            assert!(is_masked(ExceptionFlags::all()));
        }
        assert_eq!(environment(), before);
        set_environment(saved);
    }

    #[test]
    fn default_environment_is_captured_once_per_thread() {
        // A fresh thread so this test owns the whole capture lifecycle.
        std::thread::spawn(|| {
            let ambient = default_environment();
            set_rounding_mode(RoundingMode::Upward);
            raise_exception_mask(ExceptionFlags::all());
            // The default must still be the pre-write capture.
            assert_eq!(default_environment(), ambient);
            restore_default_environment();
            assert_eq!(environment(), ambient);
        })
        .join()
        .unwrap();
    }
}
