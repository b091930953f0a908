//! Result codes crossing the module boundary.

use std::fmt;

/// Raw representation of a [`ResultCode`] as it travels across the ABI.
pub type RawCode = u32;

/// Status code shared between the host and its modules.
///
/// These values are the only signals that cross the module boundary; no
/// Rust errors, panics or unwinding may pass through it in either
/// direction. The numeric values are part of the ABI and must never be
/// reordered.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The operation succeeded.
    Ok = 0,

    /// The module filled its capability table but left one or more
    /// optional entries empty. A degraded success, not a failure.
    Incomplete = 1,

    /// A required pointer argument was null.
    NullArgument = 2,

    /// An allocation failed on either side of the boundary.
    OutOfMemory = 3,

    /// The shared library could not be opened.
    LoadLibraryFailed = 4,

    /// The well-known entry symbol was not exported by the library.
    SymbolNotFound = 5,

    /// The host-provided buffer size does not match the table size the
    /// module was built against.
    SizeMismatch = 6,
}

impl ResultCode {
    /// Decode a raw value received from the other side of the boundary.
    ///
    /// Returns `None` for values outside the shared taxonomy, which the
    /// host treats as a module defect rather than mapping to a guess.
    pub const fn from_raw(raw: RawCode) -> Option<ResultCode> {
        match raw {
            0 => Some(ResultCode::Ok),
            1 => Some(ResultCode::Incomplete),
            2 => Some(ResultCode::NullArgument),
            3 => Some(ResultCode::OutOfMemory),
            4 => Some(ResultCode::LoadLibraryFailed),
            5 => Some(ResultCode::SymbolNotFound),
            6 => Some(ResultCode::SizeMismatch),
            _ => None,
        }
    }

    /// Encode for transport across the boundary.
    pub const fn into_raw(self) -> RawCode {
        self as RawCode
    }

    /// `Ok` and nothing else. `Incomplete` is a degraded success the
    /// loader handles separately.
    pub const fn is_success(self) -> bool {
        matches!(self, ResultCode::Ok)
    }

    /// Everything that is neither `Ok` nor `Incomplete`.
    pub const fn is_failure(self) -> bool {
        !matches!(self, ResultCode::Ok | ResultCode::Incomplete)
    }

    /// Stable lower-case name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            ResultCode::Ok => "ok",
            ResultCode::Incomplete => "incomplete",
            ResultCode::NullArgument => "null_argument",
            ResultCode::OutOfMemory => "out_of_memory",
            ResultCode::LoadLibraryFailed => "load_library_failed",
            ResultCode::SymbolNotFound => "symbol_not_found",
            ResultCode::SizeMismatch => "size_mismatch",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for code in [
            ResultCode::Ok,
            ResultCode::Incomplete,
            ResultCode::NullArgument,
            ResultCode::OutOfMemory,
            ResultCode::LoadLibraryFailed,
            ResultCode::SymbolNotFound,
            ResultCode::SizeMismatch,
        ] {
            assert_eq!(ResultCode::from_raw(code.into_raw()), Some(code));
        }
    }

    #[test]
    fn test_unknown_raw_is_rejected() {
        assert_eq!(ResultCode::from_raw(7), None);
        assert_eq!(ResultCode::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_classification() {
        assert!(ResultCode::Ok.is_success());
        assert!(!ResultCode::Incomplete.is_success());
        assert!(!ResultCode::Incomplete.is_failure());
        assert!(ResultCode::SizeMismatch.is_failure());
        assert!(ResultCode::LoadLibraryFailed.is_failure());
    }
}
