use thiserror::Error;

/// The error type for fpenv operations.
///
/// Every get/set operation on the active backend is infallible: the rounding
/// mode and exception flag enums are closed and exhaustively handled, and
/// unsupported backend/precision combinations are rejected at build time.
/// Errors only arise when *inspecting* ambient register state this library
/// never wrote, which may contain encodings the hardware reserves.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FpEnvError {
    /// The x87 precision-control field held the reserved `0b01` encoding.
    /// The host process configured the FPU before this library ran; the
    /// value cannot be mapped to a precision profile.
    #[error("reserved precision-control encoding {0:#05b} in ambient control word")]
    ReservedPrecisionControl(u8),

    /// The ambient control word selects 80-bit internal precision, but the
    /// compiled backend has no `Extended` profile. Most hosts default the
    /// x87 unit to 80-bit precision, so this is an expected answer when
    /// inspecting a freshly captured default environment.
    #[error("ambient precision is 80-bit extended, which this backend cannot represent")]
    ExtendedPrecisionUnavailable,
}

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, FpEnvError>;
