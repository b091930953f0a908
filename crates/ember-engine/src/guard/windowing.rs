//! Guard over the windowing capability table.

use std::ffi::CStr;
use std::ptr::NonNull;

use ember_module_sdk::{ResultCode, WindowDesc, WindowHandle, WindowingTable};

use super::{decode_code, missing_call, warn_missing};
use crate::module::CompletionState;

const SUBSYSTEM: &str = "windowing";

/// Null-checked call surface over a [`WindowingTable`].
///
/// Construction never fails: a table with every slot empty still yields
/// a guard, just one where every call reports
/// [`ResultCode::Incomplete`].
pub struct WindowingGuard {
    table: WindowingTable,
    state: CompletionState,
    missing: Vec<&'static str>,
}

impl WindowingGuard {
    pub fn new(table: WindowingTable) -> Self {
        let mut missing = Vec::new();
        if table.create_window.is_none() {
            missing.push("create_window");
        }
        if table.destroy_window.is_none() {
            missing.push("destroy_window");
        }
        if table.poll_events.is_none() {
            missing.push("poll_events");
        }
        if table.window_is_open.is_none() {
            missing.push("window_is_open");
        }
        if table.set_title.is_none() {
            missing.push("set_title");
        }

        for function in &missing {
            warn_missing(SUBSYSTEM, function);
        }

        let state = if missing.is_empty() {
            CompletionState::Complete
        } else {
            CompletionState::Incomplete
        };

        Self {
            table,
            state,
            missing,
        }
    }

    /// Build a guard from the raw table pointer handed out by the module
    /// manager.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a buffer holding a `WindowingTable` produced
    /// by a module load, and that module must stay loaded for as long as
    /// calls go through the guard.
    pub unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        // SAFETY: caller guarantees the buffer holds a WindowingTable.
        Self::new(unsafe { ptr.as_ptr().cast::<WindowingTable>().read_unaligned() })
    }

    /// Completion state decided at construction.
    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == CompletionState::Complete
    }

    /// Names of the functions the module did not provide.
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    pub fn create_window(&self, desc: &WindowDesc) -> Result<WindowHandle, ResultCode> {
        let Some(f) = self.table.create_window else {
            return Err(missing_call(SUBSYSTEM, "create_window"));
        };

        let mut window: WindowHandle = ember_module_sdk::INVALID_WINDOW;
        // SAFETY: pointer was provided by the loaded module; desc and
        // the out parameter outlive the call.
        let code = decode_code(SUBSYSTEM, "create_window", unsafe { f(desc, &mut window) });
        match code {
            ResultCode::Ok => Ok(window),
            failure => Err(failure),
        }
    }

    pub fn destroy_window(&self, window: WindowHandle) -> ResultCode {
        let Some(f) = self.table.destroy_window else {
            return missing_call(SUBSYSTEM, "destroy_window");
        };
        // SAFETY: see create_window.
        decode_code(SUBSYSTEM, "destroy_window", unsafe { f(window) })
    }

    pub fn poll_events(&self, window: WindowHandle) -> ResultCode {
        let Some(f) = self.table.poll_events else {
            return missing_call(SUBSYSTEM, "poll_events");
        };
        // SAFETY: see create_window.
        decode_code(SUBSYSTEM, "poll_events", unsafe { f(window) })
    }

    /// Whether the window is still open. Unavailable capability or a
    /// failing module call surface as `Err`, letting the caller decide
    /// what "unknown" means for it.
    pub fn window_is_open(&self, window: WindowHandle) -> Result<bool, ResultCode> {
        let Some(f) = self.table.window_is_open else {
            return Err(missing_call(SUBSYSTEM, "window_is_open"));
        };

        let mut open: u32 = 0;
        // SAFETY: see create_window.
        let code = decode_code(SUBSYSTEM, "window_is_open", unsafe { f(window, &mut open) });
        match code {
            ResultCode::Ok => Ok(open != 0),
            failure => Err(failure),
        }
    }

    pub fn set_title(&self, window: WindowHandle, title: &CStr) -> ResultCode {
        let Some(f) = self.table.set_title else {
            return missing_call(SUBSYSTEM, "set_title");
        };
        // SAFETY: see create_window; title is nul-terminated for the
        // duration of the call.
        decode_code(SUBSYSTEM, "set_title", unsafe { f(window, title.as_ptr()) })
    }
}
