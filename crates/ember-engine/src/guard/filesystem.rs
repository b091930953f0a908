//! Guard over the filesystem capability table.

use std::ffi::CStr;
use std::ptr::NonNull;

use ember_module_sdk::{FilesystemTable, ResultCode};

use super::{decode_code, missing_call, warn_missing};
use crate::module::CompletionState;

const SUBSYSTEM: &str = "filesystem";

/// Null-checked call surface over a [`FilesystemTable`].
pub struct FilesystemGuard {
    table: FilesystemTable,
    state: CompletionState,
    missing: Vec<&'static str>,
}

impl FilesystemGuard {
    pub fn new(table: FilesystemTable) -> Self {
        let mut missing = Vec::new();
        if table.read_file.is_none() {
            missing.push("read_file");
        }
        if table.write_file.is_none() {
            missing.push("write_file");
        }
        if table.watch.is_none() {
            missing.push("watch");
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
    /// `ptr` must point to a `FilesystemTable` produced by a module
    /// load, and the module must stay loaded while the guard is used.
    pub unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        // SAFETY: caller guarantees the buffer holds a FilesystemTable.
        Self::new(unsafe { ptr.as_ptr().cast::<FilesystemTable>().read_unaligned() })
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

    /// Read a file into `buffer`, returning the number of bytes the
    /// module wrote.
    pub fn read_file(&self, path: &CStr, buffer: &mut [u8]) -> Result<usize, ResultCode> {
        let Some(f) = self.table.read_file else {
            return Err(missing_call(SUBSYSTEM, "read_file"));
        };

        let mut len: usize = 0;
        // SAFETY: pointer was provided by the loaded module; path and
        // buffer outlive the call and the module writes at most
        // `buffer.len()` bytes per the contract.
        let code = decode_code(SUBSYSTEM, "read_file", unsafe {
            f(path.as_ptr(), buffer.as_mut_ptr(), buffer.len(), &mut len)
        });
        match code {
            ResultCode::Ok => Ok(len),
            failure => Err(failure),
        }
    }

    pub fn write_file(&self, path: &CStr, data: &[u8]) -> ResultCode {
        let Some(f) = self.table.write_file else {
            return missing_call(SUBSYSTEM, "write_file");
        };
        // SAFETY: see read_file.
        decode_code(SUBSYSTEM, "write_file", unsafe {
            f(path.as_ptr(), data.as_ptr(), data.len())
        })
    }

    pub fn watch(&self, path: &CStr) -> ResultCode {
        let Some(f) = self.table.watch else {
            return missing_call(SUBSYSTEM, "watch");
        };
        // SAFETY: see read_file.
        decode_code(SUBSYSTEM, "watch", unsafe { f(path.as_ptr()) })
    }
}
