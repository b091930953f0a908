//! Guard over the input capability table.

use std::ptr::NonNull;

use ember_module_sdk::{InputState, InputTable, ResultCode};

use super::{decode_code, missing_call, warn_missing};
use crate::module::CompletionState;

const SUBSYSTEM: &str = "input";

/// Null-checked call surface over an [`InputTable`].
pub struct InputGuard {
    table: InputTable,
    state: CompletionState,
    missing: Vec<&'static str>,
}

impl InputGuard {
    pub fn new(table: InputTable) -> Self {
        let mut missing = Vec::new();
        if table.poll_state.is_none() {
            missing.push("poll_state");
        }
        if table.set_capture.is_none() {
            missing.push("set_capture");
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

    /// # Safety
    ///
    /// `ptr` must point to an `InputTable` produced by a module load,
    /// and the module must stay loaded while the guard is used.
    pub unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        // SAFETY: caller guarantees the buffer holds an InputTable.
        Self::new(unsafe { ptr.as_ptr().cast::<InputTable>().read_unaligned() })
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == CompletionState::Complete
    }

    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    pub fn poll_state(&self) -> Result<InputState, ResultCode> {
        let Some(f) = self.table.poll_state else {
            return Err(missing_call(SUBSYSTEM, "poll_state"));
        };

        let mut state = InputState::default();
        // SAFETY: pointer was provided by the loaded module; the out
        // parameter outlives the call.
        let code = decode_code(SUBSYSTEM, "poll_state", unsafe { f(&mut state) });
        match code {
            ResultCode::Ok => Ok(state),
            failure => Err(failure),
        }
    }

    pub fn set_capture(&self, enabled: bool) -> ResultCode {
        let Some(f) = self.table.set_capture else {
            return missing_call(SUBSYSTEM, "set_capture");
        };
        // SAFETY: see poll_state.
        decode_code(SUBSYSTEM, "set_capture", unsafe { f(enabled as u32) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_module_sdk::{CapabilityTable, RawCode};

    unsafe extern "C" fn poll(out_state: *mut InputState) -> RawCode {
        unsafe {
            (*out_state).cursor_x = 12.0;
            (*out_state).buttons = 0b101;
        }
        ResultCode::Ok.into_raw()
    }

    #[test]
    fn test_poll_state_forwards() {
        let guard = InputGuard::new(InputTable {
            api_version: InputTable::API_VERSION.pack(),
            poll_state: Some(poll),
            set_capture: None,
        });

        let state = guard.poll_state().unwrap();
        assert_eq!(state.cursor_x, 12.0);
        assert_eq!(state.buttons, 0b101);

        assert_eq!(guard.missing(), ["set_capture"]);
        assert_eq!(guard.set_capture(true), ResultCode::Incomplete);
    }
}
