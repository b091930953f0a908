//! Capability tables: the fixed-layout contracts of the five subsystems.
//!
//! A capability table is a `#[repr(C)]` aggregate of function pointers.
//! Every table starts with a packed `api_version` so the host can check
//! compatibility without knowing the rest of the layout, and every
//! function slot is an `Option` so an older module simply leaves entries
//! it does not know about as null. The total byte size of a table is part
//! of its contract: the host passes the size it was compiled against to
//! the module entry point, and a module built against a different layout
//! reports [`SizeMismatch`](crate::ResultCode::SizeMismatch) instead of
//! writing past the buffer.
//!
//! Virtual dispatch is deliberately absent here; vtable layout is a
//! compiler implementation detail and cannot be relied on across
//! independently built binaries.

use std::os::raw::c_char;

use crate::result::RawCode;
use crate::version::ApiVersion;

/// Implemented by every capability table.
///
/// `Copy + 'static` keeps tables plain old data: the host copies them out
/// of the loader-owned buffer when constructing guards, and nothing about
/// a table may own memory or carry lifetimes.
pub trait CapabilityTable: Copy + 'static {
    /// Subsystem name used in logs and diagnostics.
    const NAME: &'static str;

    /// The table version this host/SDK build understands.
    const API_VERSION: ApiVersion;
}

/// Handle to a window issued by the windowing module.
///
/// Opaque to the host; the module resolves it internally. Zero is never a
/// valid window.
pub type WindowHandle = u64;

/// The reserved invalid [`WindowHandle`].
pub const INVALID_WINDOW: WindowHandle = 0;

/// Parameters for opening a window.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct WindowDesc {
    pub width: u32,
    pub height: u32,
    /// Nul-terminated UTF-8, may be null for an untitled window.
    pub title: *const c_char,
    /// Nonzero requests fullscreen.
    pub fullscreen: u32,
}

/// Windowing subsystem contract.
///
/// Required: `create_window`, `destroy_window`. Everything else is
/// optional capability a module may omit.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct WindowingTable {
    pub api_version: u32,
    pub create_window:
        Option<unsafe extern "C" fn(desc: *const WindowDesc, out_window: *mut WindowHandle) -> RawCode>,
    pub destroy_window: Option<unsafe extern "C" fn(window: WindowHandle) -> RawCode>,
    pub poll_events: Option<unsafe extern "C" fn(window: WindowHandle) -> RawCode>,
    pub window_is_open:
        Option<unsafe extern "C" fn(window: WindowHandle, out_open: *mut u32) -> RawCode>,
    pub set_title:
        Option<unsafe extern "C" fn(window: WindowHandle, title: *const c_char) -> RawCode>,
}

impl CapabilityTable for WindowingTable {
    const NAME: &'static str = "windowing";
    const API_VERSION: ApiVersion = ApiVersion::new(0, 2, 0);
}

/// Snapshot of input state filled by `InputTable::poll_state`.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct InputState {
    pub cursor_x: f32,
    pub cursor_y: f32,
    pub buttons: u32,
    pub keys_down: u32,
}

/// Input subsystem contract. Required: `poll_state`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InputTable {
    pub api_version: u32,
    pub poll_state: Option<unsafe extern "C" fn(out_state: *mut InputState) -> RawCode>,
    pub set_capture: Option<unsafe extern "C" fn(enabled: u32) -> RawCode>,
}

impl CapabilityTable for InputTable {
    const NAME: &'static str = "input";
    const API_VERSION: ApiVersion = ApiVersion::new(0, 2, 0);
}

/// Rendering subsystem contract. Required: `begin_frame`, `end_frame`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RenderTable {
    pub api_version: u32,
    pub begin_frame: Option<unsafe extern "C" fn() -> RawCode>,
    pub end_frame: Option<unsafe extern "C" fn() -> RawCode>,
    pub adapter_count: Option<unsafe extern "C" fn(out_count: *mut u32) -> RawCode>,
}

impl CapabilityTable for RenderTable {
    const NAME: &'static str = "renderer";
    const API_VERSION: ApiVersion = ApiVersion::new(0, 1, 0);
}

/// Audio subsystem contract. Required: `play`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AudioTable {
    pub api_version: u32,
    pub play: Option<unsafe extern "C" fn(sound: u32) -> RawCode>,
    pub stop: Option<unsafe extern "C" fn(sound: u32) -> RawCode>,
    pub set_volume: Option<unsafe extern "C" fn(volume: f32) -> RawCode>,
}

impl CapabilityTable for AudioTable {
    const NAME: &'static str = "audio";
    const API_VERSION: ApiVersion = ApiVersion::new(0, 1, 0);
}

/// Filesystem subsystem contract. Required: `read_file`, `write_file`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FilesystemTable {
    pub api_version: u32,
    pub read_file: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            buffer: *mut u8,
            capacity: usize,
            out_len: *mut usize,
        ) -> RawCode,
    >,
    pub write_file:
        Option<unsafe extern "C" fn(path: *const c_char, data: *const u8, len: usize) -> RawCode>,
    pub watch: Option<unsafe extern "C" fn(path: *const c_char) -> RawCode>,
}

impl CapabilityTable for FilesystemTable {
    const NAME: &'static str = "filesystem";
    const API_VERSION: ApiVersion = ApiVersion::new(0, 1, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_slots_are_none() {
        // Option<extern fn> uses the null-pointer niche, so an all-zero
        // buffer decodes as a table with every slot absent. The loader
        // depends on this when it hands a zeroed buffer to a module that
        // only fills part of it.
        let table: WindowingTable = unsafe { std::mem::zeroed() };
        assert!(table.create_window.is_none());
        assert!(table.destroy_window.is_none());
        assert!(table.poll_events.is_none());
        assert!(table.window_is_open.is_none());
        assert!(table.set_title.is_none());
        assert_eq!(table.api_version, 0);
    }

    #[test]
    fn test_table_versions() {
        assert_eq!(WindowingTable::API_VERSION, ApiVersion::new(0, 2, 0));
        assert_eq!(InputTable::NAME, "input");
        assert_eq!(FilesystemTable::NAME, "filesystem");
    }
}
