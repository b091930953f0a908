//! Module identity, lifecycle and the keyed registry.
//!
//! A module is one shared library (or an in-process builtin standing in
//! for one). The [`ModuleManager`] owns every loaded module exclusively:
//! it is the only holder of the OS library handle and of the buffer the
//! module wrote its capability table into, so unloading exactly once is a
//! structural property rather than a convention.

mod handle;
mod id;
mod manager;

pub use handle::{CompletionState, ModuleHandle};
pub use id::ModuleId;
pub use manager::{ModuleManager, TableSpec, VersionPolicy};

use std::path::PathBuf;

use ember_module_sdk::{ApiVersion, RawCode, ResultCode};

/// Errors from loading or validating a module.
///
/// Library and symbol failures are translated here, at the manager
/// boundary, into the shared result-code taxonomy — see
/// [`ModuleError::result_code`].
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The shared library could not be opened.
    #[error("failed to open module library {path}: {source}")]
    OpenLibrary {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The library exists but does not export the entry symbol.
    #[error("module {name} does not export `{symbol}`: {source}", symbol = ember_module_sdk::MODULE_ENTRY_SYMBOL)]
    MissingEntrySymbol {
        name: String,
        #[source]
        source: libloading::Error,
    },

    /// Allocation of the capability-table buffer failed.
    #[error("failed to allocate {size} byte capability table")]
    TableAllocation { size: usize },

    /// The module entry ran but reported a failure code.
    #[error("module {name} entry reported {code}")]
    EntryFailed { name: String, code: ResultCode },

    /// The module returned a value outside the shared taxonomy. Treated
    /// as a module defect, never guessed at.
    #[error("module {name} returned unknown result code {raw}")]
    UnknownResultCode { name: String, raw: RawCode },

    /// The table's api version differs from the host's and the version
    /// policy is [`VersionPolicy::Reject`].
    #[error("module {name} reports api version {found}, host expects {expected}")]
    VersionMismatch {
        name: String,
        expected: ApiVersion,
        found: ApiVersion,
    },
}

impl ModuleError {
    /// The boundary result code this error corresponds to, or `None` for
    /// host-policy failures that have no representation in the shared
    /// taxonomy.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            ModuleError::OpenLibrary { .. } => Some(ResultCode::LoadLibraryFailed),
            ModuleError::MissingEntrySymbol { .. } => Some(ResultCode::SymbolNotFound),
            ModuleError::TableAllocation { .. } => Some(ResultCode::OutOfMemory),
            ModuleError::EntryFailed { code, .. } => Some(*code),
            ModuleError::UnknownResultCode { .. } | ModuleError::VersionMismatch { .. } => None,
        }
    }
}
