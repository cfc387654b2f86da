// This crate contains testing utilities which need to be shared across
// multiple crates in this project: tracing initialisation for test binaries
// and out-of-band floating-point register reads, so integration tests can
// verify what the library claims about hardware state without going through
// the library itself.

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a tracing subscriber honouring `RUST_LOG`, once per process.
/// Subsequent calls are no-ops and return `Ok`.
pub fn init_tracing() -> Result<()> {
    TRACING
        .get_or_try_init(|| {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init()
                .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
            tracing::debug!("test tracing initialised");
            Ok(())
        })
        .map(|_| ())
}

/// Read MXCSR directly, bypassing the library under test.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn ambient_mxcsr() -> u32 {
    let mut mxcsr: u32 = 0;
    unsafe {
        std::arch::asm!("stmxcsr [{}]", in(reg) &mut mxcsr, options(nostack, preserves_flags));
    }
    mxcsr
}

/// Read the 387 control word directly, bypassing the library under test.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn ambient_x87_control_word() -> u16 {
    let mut cw: u16 = 0;
    unsafe {
        std::arch::asm!("fnstcw [{}]", in(reg) &mut cw, options(nostack, preserves_flags));
    }
    cw
}

/// Read FPCR directly, bypassing the library under test.
#[cfg(target_arch = "aarch64")]
pub fn ambient_fpcr() -> u64 {
    let fpcr: u64;
    unsafe {
        std::arch::asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
    }
    fpcr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing().unwrap();
        init_tracing().unwrap();
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn ambient_reads_are_side_effect_free() {
        assert_eq!(ambient_mxcsr(), ambient_mxcsr());
        assert_eq!(ambient_x87_control_word(), ambient_x87_control_word());
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn ambient_reads_are_side_effect_free() {
        assert_eq!(ambient_fpcr(), ambient_fpcr());
    }
}
