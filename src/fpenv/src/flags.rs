use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// The IEEE-754 rounding mode of the current thread's floating-point unit.
///
/// Exactly one mode is active per thread at any time. The native encoding
/// differs per backend (the x87 and SSE rounding fields even sit at different
/// bit offsets, and the FPCR orders the directed modes differently), but the
/// four modes mean the same thing everywhere.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum RoundingMode {
    /// Round to nearest, ties to even. The ambient default on every
    /// supported platform.
    ToNearest,
    /// Round towards negative infinity.
    Downward,
    /// Round towards positive infinity.
    Upward,
    /// Round towards zero (truncate).
    TowardZero,
}

bitflags! {
    /// A set of floating-point exception kinds.
    ///
    /// The in-memory layout matches the low bits of the 387 control word, the
    /// convention the rest of the crate translates from. A *set* mask bit
    /// means the exception is masked (non-trapping) and the operation
    /// substitutes a defined result instead; this follows the IEEE
    /// control-word convention and is deliberately not "corrected".
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ExceptionFlags: u32 {
        /// Invalid operation. When masked, produces a quiet NaN.
        const INVALID = 1 << 0;
        /// Denormal operand. Only the x86 FPUs report this condition; the
        /// flag does not exist on the NEON and software backends.
        #[cfg(x86_fpu)]
        const DENORMAL = 1 << 1;
        /// Division by zero. When masked, produces a signed infinity.
        const DIV_BY_ZERO = 1 << 2;
        /// Overflow. When masked, rounds to the nearest representable value
        /// or infinity according to the rounding mode.
        const OVERFLOW = 1 << 3;
        /// Underflow. When masked, produces zero or a denormal.
        const UNDERFLOW = 1 << 4;
        /// Inexact result (e.g. `sqrt(2)` is never exact).
        const INEXACT = 1 << 5;
    }
}

impl std::fmt::Display for ExceptionFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{}", name)?;
            first = false;
        }
        Ok(())
    }
}

/// The internal working precision applied to a worker thread.
///
/// Selecting a profile is a thread-wide operation, not a call-scoped one; a
/// thread transitions between profiles by applying a new one. `Extended` only
/// exists when the legacy stack backend is compiled, because no other backend
/// has an 80-bit mode; requesting it elsewhere fails to build rather than
/// silently degrading.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum PrecisionProfile {
    /// 32-bit internal operations.
    Simple,
    /// 64-bit internal operations.
    Double,
    /// 80-bit internal operations, legacy stack FPU only.
    #[cfg(x87_backend)]
    Extended,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn exception_flags_display() {
        assert_eq!(format!("{}", ExceptionFlags::empty()), "NONE");
        assert_eq!(format!("{}", ExceptionFlags::INVALID), "INVALID");
        let combined = ExceptionFlags::DIV_BY_ZERO | ExceptionFlags::OVERFLOW;
        assert_eq!(format!("{}", combined), "DIV_BY_ZERO | OVERFLOW");
    }

    #[test]
    fn all_flags_fit_the_control_word_mask_field() {
        // The semantic layout is the 387 mask field, bits 0..5.
        assert_eq!(ExceptionFlags::all().bits() & !0x3F, 0);
    }

    #[test]
    fn rounding_modes_are_closed() {
        assert_eq!(RoundingMode::iter().count(), 4);
    }
}
