//! The module entry point: one exported symbol per shared library.

use crate::result::{RawCode, ResultCode};
use crate::tables::CapabilityTable;

/// Name of the single C-linkage symbol every module exports.
pub const MODULE_ENTRY_SYMBOL: &str = "ember_module_entry";

/// Nul-terminated form of [`MODULE_ENTRY_SYMBOL`] for the symbol resolver.
pub const MODULE_ENTRY_SYMBOL_C: &[u8] = b"ember_module_entry\0";

/// Signature of the exported entry point.
///
/// The host allocates `table_size` zeroed bytes and passes them in; the
/// module writes its capability table into the buffer and returns a
/// [`ResultCode`] as raw `u32`. The module must never write more than
/// `table_size` bytes and must return
/// [`SizeMismatch`](ResultCode::SizeMismatch) when `table_size` differs
/// from the table size it was built against.
pub type ModuleEntryFn = unsafe extern "C" fn(table: *mut u8, table_size: usize) -> RawCode;

/// Write a capability table into a host-provided buffer.
///
/// Performs the argument checking the ABI requires of every module:
/// a null destination yields [`ResultCode::NullArgument`] and a size that
/// does not match `size_of::<T>()` yields [`ResultCode::SizeMismatch`]
/// without touching the buffer.
///
/// # Safety
///
/// When `out` is non-null it must be valid for writes of `out_size`
/// bytes. The host loader always satisfies this; hand-rolled callers must
/// uphold it themselves.
pub unsafe fn fill_table<T: CapabilityTable>(out: *mut u8, out_size: usize, table: T) -> ResultCode {
    if out.is_null() {
        return ResultCode::NullArgument;
    }
    if out_size != std::mem::size_of::<T>() {
        return ResultCode::SizeMismatch;
    }

    // SAFETY: checked non-null and exactly size_of::<T>() bytes; the host
    // buffer carries the table's alignment but unaligned writes keep this
    // correct even for callers that do not.
    unsafe { std::ptr::write_unaligned(out.cast::<T>(), table) };

    ResultCode::Ok
}

/// Shared entry body used by [`export_module!`](crate::export_module) and
/// by in-process builtin entries.
///
/// `build` produces the filled table plus the code the module wants to
/// report — [`ResultCode::Ok`] for a complete table or
/// [`ResultCode::Incomplete`] when optional entries were left empty.
/// Buffer validation failures take precedence over the reported code.
///
/// # Safety
///
/// Same contract as [`fill_table`].
pub unsafe fn entry_with<T: CapabilityTable>(
    out: *mut u8,
    out_size: usize,
    build: fn() -> (T, ResultCode),
) -> RawCode {
    let (table, code) = build();
    match unsafe { fill_table(out, out_size, table) } {
        ResultCode::Ok => code.into_raw(),
        err => err.into_raw(),
    }
}

/// Export the module entry symbol for a shared-library module.
///
/// Takes the capability table type and a `fn() -> (T, ResultCode)` that
/// builds the filled table. Expands to the exported
/// `ember_module_entry` with all buffer checking handled by the SDK.
///
/// ```ignore
/// ember_module_sdk::export_module!(WindowingTable, build_windowing);
/// ```
#[macro_export]
macro_rules! export_module {
    ($table:ty, $build:path) => {
        /// Module entry point resolved by the Ember host.
        #[no_mangle]
        pub unsafe extern "C" fn ember_module_entry(
            table: *mut u8,
            table_size: usize,
        ) -> $crate::RawCode {
            // SAFETY: the host passes a buffer valid for `table_size` bytes.
            unsafe { $crate::entry_with::<$table>(table, table_size, $build) }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{AudioTable, CapabilityTable};
    use crate::version::ApiVersion;

    fn sample_table() -> AudioTable {
        AudioTable {
            api_version: AudioTable::API_VERSION.pack(),
            play: Some(play),
            stop: None,
            set_volume: None,
        }
    }

    unsafe extern "C" fn play(_sound: u32) -> RawCode {
        ResultCode::Ok.into_raw()
    }

    #[test]
    fn test_fill_table_rejects_null() {
        let code = unsafe { fill_table(std::ptr::null_mut(), std::mem::size_of::<AudioTable>(), sample_table()) };
        assert_eq!(code, ResultCode::NullArgument);
    }

    #[test]
    fn test_fill_table_rejects_size_mismatch() {
        let mut buf = vec![0u8; std::mem::size_of::<AudioTable>()];
        let code = unsafe { fill_table(buf.as_mut_ptr(), buf.len() - 1, sample_table()) };
        assert_eq!(code, ResultCode::SizeMismatch);
        // The buffer stays untouched on rejection.
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_table_writes_version_first() {
        let mut buf = vec![0u8; std::mem::size_of::<AudioTable>()];
        let code = unsafe { fill_table(buf.as_mut_ptr(), buf.len(), sample_table()) };
        assert_eq!(code, ResultCode::Ok);

        // api_version leads the table, so the first four bytes decode to
        // the packed version without knowing the full layout.
        let packed = u32::from_ne_bytes(buf[..4].try_into().unwrap());
        assert_eq!(ApiVersion::unpack(packed), AudioTable::API_VERSION);
    }

    #[test]
    fn test_entry_with_propagates_module_code() {
        fn build_incomplete() -> (AudioTable, ResultCode) {
            (sample_table(), ResultCode::Incomplete)
        }

        let mut buf = vec![0u8; std::mem::size_of::<AudioTable>()];
        let raw = unsafe { entry_with(buf.as_mut_ptr(), buf.len(), build_incomplete) };
        assert_eq!(ResultCode::from_raw(raw), Some(ResultCode::Incomplete));

        // A bad buffer wins over whatever the module wanted to report.
        let raw = unsafe { entry_with(buf.as_mut_ptr(), buf.len() + 8, build_incomplete) };
        assert_eq!(ResultCode::from_raw(raw), Some(ResultCode::SizeMismatch));
    }
}
