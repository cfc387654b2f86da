//! Per-thread precision profile initialisation.

use tracing::{instrument, Span};

use crate::backend::{ActiveDriver, FpuBackend};
use crate::env::capture_default;
use crate::flags::PrecisionProfile;

/// Configure this thread's floating-point unit for the given precision
/// profile.
///
/// Worker threads must call this before any floating-point computation that
/// participates in lockstep determinism, and again whenever they transition
/// between code regions declared to need different profiles (a fast
/// low-precision phase followed by a `Double` verification phase, say).
/// Thread-management code owns that obligation; this crate cannot enforce
/// it.
///
/// The internal-precision bits are rewritten from scratch on the backends
/// that have them; on NEON and the software backend the width step is a
/// no-op, while denormal handling is still configured according to the
/// `no-denormals` feature. Applying the same profile twice leaves the
/// registers exactly as one application does.
#[instrument(parent = Span::current(), level = "Trace")]
pub fn apply_profile(profile: PrecisionProfile) {
    capture_default();
    log::trace!(
        "applying precision profile {:?} on {} backend",
        profile,
        ActiveDriver::NAME
    );
    ActiveDriver::apply_profile(profile);
}
