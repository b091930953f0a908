//! Windowing module stub for exercising the module substrate.
//!
//! Built as both `cdylib` and `rlib`: the shared-library form is a real
//! module the host can discover on disk, while the rlib form lets tests
//! and the demo host register the same entry functions as in-process
//! builtins without fixture files.
//!
//! Windows here are bookkeeping only — no OS surface is created. What
//! the module does model faithfully is the shared default state all
//! windows are issued from: it tracks an internal reference count, and
//! tearing it down while windows still reference it is reported as a
//! design error instead of passing silently.

use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::{Mutex, OnceLock};

use ember_module_sdk::prelude::*;

struct WindowRecord {
    open: bool,
    title: String,
}

/// Shared default state windows are issued from.
struct ModuleState {
    next_window: WindowHandle,
    windows: HashMap<WindowHandle, WindowRecord>,
}

impl ModuleState {
    fn new() -> Self {
        Self {
            next_window: 1,
            windows: HashMap::new(),
        }
    }
}

static STATE: OnceLock<Mutex<ModuleState>> = OnceLock::new();

fn with_state<R>(f: impl FnOnce(&mut ModuleState) -> R) -> R {
    let mutex = STATE.get_or_init(|| Mutex::new(ModuleState::new()));
    // A panicking test elsewhere in the process must not wedge the
    // module; recover the inner state from a poisoned lock.
    let mut guard = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Number of windows currently referencing the shared state.
pub fn live_window_count() -> usize {
    with_state(|state| state.windows.len())
}

/// Tear down the shared default state.
///
/// Returns the number of windows that still referenced it. A nonzero
/// count is a design error in the embedding application — reported and
/// returned, not silently swallowed and not force-fixed on its behalf.
pub fn reset_module_state() -> usize {
    with_state(|state| {
        let live = state.windows.len();
        if live > 0 {
            tracing::error!(
                "windowing state destroyed but still has {} object(s) referencing it",
                live
            );
        }
        state.windows.clear();
        state.next_window = 1;
        live
    })
}

/// Simulate the user closing a window, as a window system would.
pub fn close_window(window: WindowHandle) {
    with_state(|state| {
        if let Some(record) = state.windows.get_mut(&window) {
            record.open = false;
        }
    });
}

/// Last title set on a window, for assertions.
pub fn window_title(window: WindowHandle) -> Option<String> {
    with_state(|state| state.windows.get(&window).map(|r| r.title.clone()))
}

unsafe extern "C" fn create_window(
    desc: *const WindowDesc,
    out_window: *mut WindowHandle,
) -> RawCode {
    if desc.is_null() || out_window.is_null() {
        return ResultCode::NullArgument.into_raw();
    }

    // SAFETY: checked non-null; the host keeps desc alive for the call.
    let desc = unsafe { &*desc };
    let title = if desc.title.is_null() {
        String::new()
    } else {
        // SAFETY: the contract requires a nul-terminated title.
        unsafe { CStr::from_ptr(desc.title) }
            .to_string_lossy()
            .into_owned()
    };

    let window = with_state(|state| {
        let window = state.next_window;
        state.next_window += 1;
        state.windows.insert(window, WindowRecord { open: true, title });
        window
    });

    // SAFETY: checked non-null above.
    unsafe { *out_window = window };
    ResultCode::Ok.into_raw()
}

unsafe extern "C" fn destroy_window(window: WindowHandle) -> RawCode {
    let removed = with_state(|state| state.windows.remove(&window).is_some());
    if removed {
        ResultCode::Ok.into_raw()
    } else {
        ResultCode::NullArgument.into_raw()
    }
}

unsafe extern "C" fn poll_events(_window: WindowHandle) -> RawCode {
    // No event source to drain in the stub.
    ResultCode::Ok.into_raw()
}

unsafe extern "C" fn window_is_open(window: WindowHandle, out_open: *mut u32) -> RawCode {
    if out_open.is_null() {
        return ResultCode::NullArgument.into_raw();
    }

    let open = with_state(|state| state.windows.get(&window).map(|r| r.open).unwrap_or(false));
    // SAFETY: checked non-null above.
    unsafe { *out_open = open as u32 };
    ResultCode::Ok.into_raw()
}

unsafe extern "C" fn set_title(window: WindowHandle, title: *const c_char) -> RawCode {
    if title.is_null() {
        return ResultCode::NullArgument.into_raw();
    }

    // SAFETY: checked non-null; contract requires nul termination.
    let title = unsafe { CStr::from_ptr(title) }.to_string_lossy().into_owned();
    let found = with_state(|state| match state.windows.get_mut(&window) {
        Some(record) => {
            record.title = title;
            true
        }
        None => false,
    });

    if found {
        ResultCode::Ok.into_raw()
    } else {
        ResultCode::NullArgument.into_raw()
    }
}

fn build_windowing() -> (WindowingTable, ResultCode) {
    let table = WindowingTable {
        api_version: WindowingTable::API_VERSION.pack(),
        create_window: Some(create_window),
        destroy_window: Some(destroy_window),
        poll_events: Some(poll_events),
        window_is_open: Some(window_is_open),
        set_title: Some(set_title),
    };
    (table, ResultCode::Ok)
}

ember_module_sdk::export_module!(WindowingTable, build_windowing);

/// Entry producing a table with only the required window functions, the
/// way a module built against an older windowing contract would.
///
/// # Safety
///
/// Same contract as any module entry: `table` must be valid for
/// `table_size` bytes when non-null.
pub unsafe extern "C" fn incomplete_entry(table: *mut u8, table_size: usize) -> RawCode {
    fn build() -> (WindowingTable, ResultCode) {
        let table = WindowingTable {
            api_version: WindowingTable::API_VERSION.pack(),
            create_window: Some(create_window),
            destroy_window: Some(destroy_window),
            poll_events: None,
            window_is_open: None,
            set_title: None,
        };
        (table, ResultCode::Incomplete)
    }

    // SAFETY: forwarded caller contract.
    unsafe { entry_with(table, table_size, build) }
}

/// Entry that refuses to produce a table at all, for exercising the
/// failure path of the loader.
///
/// # Safety
///
/// Never touches the buffer; trivially safe to call with any arguments.
pub unsafe extern "C" fn failing_entry(_table: *mut u8, _table_size: usize) -> RawCode {
    ResultCode::OutOfMemory.into_raw()
}
