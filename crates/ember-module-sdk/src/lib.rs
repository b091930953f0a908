//! Ember Module SDK
//!
//! This crate is the binary contract between the Ember host and its
//! subsystem modules. A module is an independently built shared library
//! that exports exactly one C-linkage entry symbol; the host calls that
//! symbol with a caller-allocated buffer and the module fills it with a
//! fixed-layout capability table of function pointers.
//!
//! Both sides of the boundary depend on this crate and nothing else from
//! each other. No Rust types with unstable layout, no trait objects and no
//! panics cross the boundary — only `#[repr(C)]` tables, raw pointers and
//! [`ResultCode`] values.
//!
//! # Writing a module
//!
//! ```no_run
//! use ember_module_sdk::prelude::*;
//!
//! fn build() -> (RenderTable, ResultCode) {
//!     let table = RenderTable {
//!         api_version: RenderTable::API_VERSION.pack(),
//!         begin_frame: Some(begin_frame),
//!         end_frame: Some(end_frame),
//!         adapter_count: None,
//!     };
//!     // Optional entries left empty: report a degraded table.
//!     (table, ResultCode::Incomplete)
//! }
//!
//! unsafe extern "C" fn begin_frame() -> u32 { ResultCode::Ok.into_raw() }
//! unsafe extern "C" fn end_frame() -> u32 { ResultCode::Ok.into_raw() }
//!
//! ember_module_sdk::export_module!(RenderTable, build);
//! ```

pub mod entry;
pub mod result;
pub mod tables;
pub mod version;

pub use entry::{entry_with, fill_table, ModuleEntryFn, MODULE_ENTRY_SYMBOL, MODULE_ENTRY_SYMBOL_C};
pub use result::{RawCode, ResultCode};
pub use tables::{
    AudioTable, CapabilityTable, FilesystemTable, InputState, InputTable, RenderTable, WindowDesc,
    WindowHandle, WindowingTable, INVALID_WINDOW,
};
pub use version::ApiVersion;

/// Prelude with everything a module author needs.
pub mod prelude {
    pub use crate::entry::{entry_with, fill_table, ModuleEntryFn, MODULE_ENTRY_SYMBOL};
    pub use crate::result::{RawCode, ResultCode};
    pub use crate::tables::{
        AudioTable, CapabilityTable, FilesystemTable, InputState, InputTable, RenderTable,
        WindowDesc, WindowHandle, WindowingTable, INVALID_WINDOW,
    };
    pub use crate::version::ApiVersion;
}

/// Map a canonical module base name to the platform shared-library file name.
///
/// `module_file_name("ember_windowing")` yields `libember_windowing.so` on
/// Linux, `libember_windowing.dylib` on macOS and `ember_windowing.dll` on
/// Windows. The canonical base name (not the platform file name) is what
/// module identity hashes are derived from.
pub fn module_file_name(base: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        base,
        std::env::consts::DLL_SUFFIX
    )
}
