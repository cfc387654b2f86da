//! Raw x86 control register access.
//!
//! The no-wait instruction forms (`fnstcw`, `fnstsw`, `fnclex`) are used
//! throughout so that reads never synchronise with, or disturb, pending
//! results queued on the numeric stack.

use std::arch::asm;

/// Read the 387 control word.
pub(crate) fn read_control_word() -> u16 {
    let mut cw: u16 = 0;
    unsafe {
        asm!("fnstcw [{}]", in(reg) &mut cw, options(nostack, preserves_flags));
    }
    cw
}

/// Load the 387 control word.
pub(crate) fn write_control_word(cw: u16) {
    unsafe {
        asm!("fldcw [{}]", in(reg) &cw, options(nostack, preserves_flags));
    }
}

/// Read the 387 status word without checking pending exceptions.
pub(crate) fn read_status_word() -> u16 {
    let sw: u16;
    unsafe {
        asm!("fnstsw ax", out("ax") sw, options(nomem, nostack, preserves_flags));
    }
    sw
}

/// Clear every pending x87 exception. The hardware offers no per-kind
/// clear, so sticky clearing on the x87 side is whole-register.
pub(crate) fn clear_pending_exceptions() {
    unsafe {
        asm!("fnclex", options(nomem, nostack, preserves_flags));
    }
}

/// Read MXCSR.
#[cfg(sse_backend)]
pub(crate) fn read_mxcsr() -> u32 {
    let mut mxcsr: u32 = 0;
    unsafe {
        asm!("stmxcsr [{}]", in(reg) &mut mxcsr, options(nostack, preserves_flags));
    }
    mxcsr
}

/// Load MXCSR. The value is clamped to the architecturally defined bits;
/// loading a set reserved bit raises a general-protection fault.
#[cfg(sse_backend)]
pub(crate) fn write_mxcsr(mxcsr: u32) {
    let clamped = mxcsr & crate::codec::mxcsr::DEFINED_BITS;
    unsafe {
        asm!("ldmxcsr [{}]", in(reg) &clamped, options(nostack, preserves_flags));
    }
}
