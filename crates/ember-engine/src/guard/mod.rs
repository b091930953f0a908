//! Guards that make raw capability tables safe to call.
//!
//! A guard copies the plain-old-data table out of the loader-owned
//! buffer, decides completeness once at construction (warning once per
//! missing function), and exposes one wrapper per table entry. A wrapper
//! whose underlying pointer is null logs an error and returns the
//! [`ResultCode::Incomplete`] sentinel instead of faulting, so a module
//! built against an older contract degrades instead of crashing the
//! host. Callers detect "this operation is unavailable" through the
//! returned code like any other result.
//!
//! The function pointers inside a guard stay valid only while the module
//! that produced them is loaded; the engine context upholds this by
//! owning every guard and dropping them before module teardown.

mod audio;
mod filesystem;
mod input;
mod render;
mod windowing;

pub use audio::AudioGuard;
pub use filesystem::FilesystemGuard;
pub use input::InputGuard;
pub use render::RenderGuard;
pub use windowing::WindowingGuard;

use ember_module_sdk::{RawCode, ResultCode};

/// Warn once, at guard construction, about an absent function.
pub(crate) fn warn_missing(subsystem: &str, function: &str) {
    tracing::warn!(
        "{} module does not provide `{}`; calls will report incomplete",
        subsystem,
        function
    );
}

/// Report a call to an absent function and produce the sentinel.
pub(crate) fn missing_call(subsystem: &str, function: &str) -> ResultCode {
    tracing::error!(
        "{} capability `{}` was called but the loaded module does not provide it",
        subsystem,
        function
    );
    ResultCode::Incomplete
}

/// Decode a raw code returned by a module function, reporting values
/// outside the taxonomy instead of faulting on them.
pub(crate) fn decode_code(subsystem: &str, function: &str, raw: RawCode) -> ResultCode {
    match ResultCode::from_raw(raw) {
        Some(code) => code,
        None => {
            tracing::error!(
                "{} capability `{}` returned unknown result code {}",
                subsystem,
                function,
                raw
            );
            ResultCode::Incomplete
        }
    }
}
