//! Lossless bit-level translation between the semantic enums and the native
//! control register encoding of each backend.
//!
//! Nothing in this module touches a register: the codecs are pure bit
//! arithmetic over integer values and compile (and unit-test) on every
//! target, including targets whose hardware cannot execute the matching
//! backend driver.

pub mod fpcr;
pub mod mxcsr;
pub mod x87;
