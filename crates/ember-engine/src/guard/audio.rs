//! Guard over the audio capability table.

use std::ptr::NonNull;

use ember_module_sdk::{AudioTable, ResultCode};

use super::{decode_code, missing_call, warn_missing};
use crate::module::CompletionState;

const SUBSYSTEM: &str = "audio";

/// Null-checked call surface over an [`AudioTable`].
pub struct AudioGuard {
    table: AudioTable,
    state: CompletionState,
    missing: Vec<&'static str>,
}

impl AudioGuard {
    pub fn new(table: AudioTable) -> Self {
        let mut missing = Vec::new();
        if table.play.is_none() {
            missing.push("play");
        }
        if table.stop.is_none() {
            missing.push("stop");
        }
        if table.set_volume.is_none() {
            missing.push("set_volume");
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
    /// `ptr` must point to an `AudioTable` produced by a module load,
    /// and the module must stay loaded while the guard is used.
    pub unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        // SAFETY: caller guarantees the buffer holds an AudioTable.
        Self::new(unsafe { ptr.as_ptr().cast::<AudioTable>().read_unaligned() })
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

    pub fn play(&self, sound: u32) -> ResultCode {
        let Some(f) = self.table.play else {
            return missing_call(SUBSYSTEM, "play");
        };
        // SAFETY: pointer was provided by the loaded module.
        decode_code(SUBSYSTEM, "play", unsafe { f(sound) })
    }

    pub fn stop(&self, sound: u32) -> ResultCode {
        let Some(f) = self.table.stop else {
            return missing_call(SUBSYSTEM, "stop");
        };
        // SAFETY: see play.
        decode_code(SUBSYSTEM, "stop", unsafe { f(sound) })
    }

    pub fn set_volume(&self, volume: f32) -> ResultCode {
        let Some(f) = self.table.set_volume else {
            return missing_call(SUBSYSTEM, "set_volume");
        };
        // SAFETY: see play.
        decode_code(SUBSYSTEM, "set_volume", unsafe { f(volume) })
    }
}
