//! Guard over the rendering capability table.

use std::ptr::NonNull;

use ember_module_sdk::{RenderTable, ResultCode};

use super::{decode_code, missing_call, warn_missing};
use crate::module::CompletionState;

const SUBSYSTEM: &str = "renderer";

/// Null-checked call surface over a [`RenderTable`].
pub struct RenderGuard {
    table: RenderTable,
    state: CompletionState,
    missing: Vec<&'static str>,
}

impl RenderGuard {
    pub fn new(table: RenderTable) -> Self {
        let mut missing = Vec::new();
        if table.begin_frame.is_none() {
            missing.push("begin_frame");
        }
        if table.end_frame.is_none() {
            missing.push("end_frame");
        }
        if table.adapter_count.is_none() {
            missing.push("adapter_count");
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
    /// `ptr` must point to a `RenderTable` produced by a module load,
    /// and the module must stay loaded while the guard is used.
    pub unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        // SAFETY: caller guarantees the buffer holds a RenderTable.
        Self::new(unsafe { ptr.as_ptr().cast::<RenderTable>().read_unaligned() })
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

    pub fn begin_frame(&self) -> ResultCode {
        let Some(f) = self.table.begin_frame else {
            return missing_call(SUBSYSTEM, "begin_frame");
        };
        // SAFETY: pointer was provided by the loaded module.
        decode_code(SUBSYSTEM, "begin_frame", unsafe { f() })
    }

    pub fn end_frame(&self) -> ResultCode {
        let Some(f) = self.table.end_frame else {
            return missing_call(SUBSYSTEM, "end_frame");
        };
        // SAFETY: see begin_frame.
        decode_code(SUBSYSTEM, "end_frame", unsafe { f() })
    }

    pub fn adapter_count(&self) -> Result<u32, ResultCode> {
        let Some(f) = self.table.adapter_count else {
            return Err(missing_call(SUBSYSTEM, "adapter_count"));
        };

        let mut count: u32 = 0;
        // SAFETY: see begin_frame; the out parameter outlives the call.
        let code = decode_code(SUBSYSTEM, "adapter_count", unsafe { f(&mut count) });
        match code {
            ResultCode::Ok => Ok(count),
            failure => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_module_sdk::{CapabilityTable, RawCode};

    unsafe extern "C" fn frame_ok() -> RawCode {
        ResultCode::Ok.into_raw()
    }

    #[test]
    fn test_missing_adapter_count() {
        let guard = RenderGuard::new(RenderTable {
            api_version: RenderTable::API_VERSION.pack(),
            begin_frame: Some(frame_ok),
            end_frame: Some(frame_ok),
            adapter_count: None,
        });

        assert_eq!(guard.state(), CompletionState::Incomplete);
        assert_eq!(guard.begin_frame(), ResultCode::Ok);
        assert_eq!(guard.adapter_count(), Err(ResultCode::Incomplete));
    }
}
