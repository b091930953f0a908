//! Keyed registry of loaded modules: load, unload, reset.

use std::alloc::Layout;
use std::collections::HashMap;
use std::path::Path;
use std::ptr::NonNull;

use ember_module_sdk::{
    ApiVersion, CapabilityTable, ModuleEntryFn, ResultCode, MODULE_ENTRY_SYMBOL_C,
};

use super::handle::{ModuleLibrary, TableBuffer};
use super::{CompletionState, ModuleError, ModuleHandle, ModuleId};

/// What the host expects of a capability table: its byte layout and the
/// api version it was compiled against. The size is part of the ABI
/// contract — a module built against a different layout detects the
/// mismatch instead of writing past the buffer.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub layout: Layout,
    pub api_version: ApiVersion,
}

impl TableSpec {
    /// The spec for a table type this host build knows.
    pub fn of<T: CapabilityTable>() -> Self {
        Self {
            layout: Layout::new::<T>(),
            api_version: T::API_VERSION,
        }
    }
}

/// How the host reacts when a module's table reports an api version
/// other than the one the host was compiled against.
///
/// The spec deliberately leaves this a host decision; it must be explicit
/// rather than an implicit side effect of the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// Treat the mismatch as a load failure for that module.
    Reject,
    /// Log a warning and keep the module.
    #[default]
    Warn,
    /// Accept silently.
    Allow,
}

/// Owner of every loaded module.
///
/// Maps [`ModuleId`] to [`ModuleHandle`]; keys are unique and insertion
/// order carries no meaning. The manager never hands out the OS library
/// handle — callers get the raw table pointer from [`table`] and are
/// expected to wrap it in a guard before calling through it.
///
/// [`table`]: ModuleManager::table
pub struct ModuleManager {
    modules: HashMap<ModuleId, ModuleHandle>,
    version_policy: VersionPolicy,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::with_version_policy(VersionPolicy::default())
    }

    pub fn with_version_policy(version_policy: VersionPolicy) -> Self {
        Self {
            modules: HashMap::new(),
            version_policy,
        }
    }

    pub fn version_policy(&self) -> VersionPolicy {
        self.version_policy
    }

    /// Load a module from a shared library on disk.
    ///
    /// Idempotent: an id that is already registered returns its recorded
    /// completion state without touching the library again. On any
    /// failure nothing is retained — the library (if it was opened) is
    /// closed, the buffer freed, and the registry left exactly as it
    /// was.
    pub fn load(
        &mut self,
        path: &Path,
        id: ModuleId,
        spec: TableSpec,
    ) -> Result<CompletionState, ModuleError> {
        if let Some(handle) = self.modules.get(&id) {
            tracing::debug!("module {} ({}) already loaded", handle.name(), id);
            return Ok(handle.state());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        // SAFETY: opening a library runs its initializers; the module
        // contract restricts modules to initialization free of global
        // side effects beyond what any Rust cdylib performs.
        let library = unsafe { libloading::Library::new(path) }.map_err(|source| {
            ModuleError::OpenLibrary {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let entry: ModuleEntryFn = {
            // SAFETY: the symbol is declared with the fixed entry
            // signature every module exports under this name.
            let symbol = unsafe { library.get::<ModuleEntryFn>(MODULE_ENTRY_SYMBOL_C) }.map_err(
                |source| ModuleError::MissingEntrySymbol {
                    name: name.clone(),
                    source,
                },
            )?;
            *symbol
        };

        self.install(name, id, ModuleLibrary::Shared(library), entry, spec)
    }

    /// Load a module whose entry function is linked into the host.
    ///
    /// Builtins run the same pipeline as shared libraries — zeroed
    /// buffer, entry invocation, classification, version check — minus
    /// the OS library handling. Hosts use this for statically linked
    /// subsystems; tests use it to exercise the substrate without
    /// fixture libraries on disk.
    pub fn load_builtin(
        &mut self,
        name: &str,
        id: ModuleId,
        entry: ModuleEntryFn,
        spec: TableSpec,
    ) -> Result<CompletionState, ModuleError> {
        if let Some(handle) = self.modules.get(&id) {
            tracing::debug!("module {} ({}) already loaded", handle.name(), id);
            return Ok(handle.state());
        }

        self.install(name.to_string(), id, ModuleLibrary::Builtin, entry, spec)
    }

    fn install(
        &mut self,
        name: String,
        id: ModuleId,
        library: ModuleLibrary,
        entry: ModuleEntryFn,
        spec: TableSpec,
    ) -> Result<CompletionState, ModuleError> {
        let mut table = TableBuffer::zeroed(spec.layout)?;

        // SAFETY: the buffer is valid for exactly the size we pass; the
        // entry contract forbids the module writing beyond it.
        let raw = unsafe { entry(table.as_mut_ptr(), table.size()) };

        let code = ResultCode::from_raw(raw).ok_or(ModuleError::UnknownResultCode {
            name: name.clone(),
            raw,
        })?;

        let state = match code {
            ResultCode::Ok => CompletionState::Complete,
            ResultCode::Incomplete => {
                tracing::warn!(
                    "module {} reported an incomplete capability table; functionality may be limited",
                    name
                );
                CompletionState::Incomplete
            }
            failure => {
                return Err(ModuleError::EntryFailed {
                    name,
                    code: failure,
                })
            }
        };

        let found = ApiVersion::unpack(table.api_version());
        if found != spec.api_version {
            match self.version_policy {
                VersionPolicy::Reject => {
                    return Err(ModuleError::VersionMismatch {
                        name,
                        expected: spec.api_version,
                        found,
                    })
                }
                VersionPolicy::Warn => tracing::warn!(
                    "module {} reports api version {}, host expects {}",
                    name,
                    found,
                    spec.api_version
                ),
                VersionPolicy::Allow => {}
            }
        }

        // A distinct name mapping to an occupied id is a hash collision,
        // which the data model treats as a defect in the module set.
        debug_assert!(!self.modules.contains_key(&id));

        tracing::info!("loaded module {} ({})", name, id);
        self.modules
            .insert(id, ModuleHandle::new(id, name, library, table, state));

        Ok(state)
    }

    /// Unload a module, freeing its table and closing its library.
    ///
    /// An id that is unknown or already unloaded is a no-op, not an
    /// error; the entry leaves the map on the first unload so a second
    /// call has nothing left to free.
    pub fn unload(&mut self, id: ModuleId) {
        if let Some(handle) = self.modules.remove(&id) {
            tracing::info!("unloaded module {} ({})", handle.name(), id);
        }
    }

    /// Raw pointer to the capability table of a loaded module.
    ///
    /// `None` for unknown or unloaded ids. Callers wrap the pointer in
    /// the matching table guard rather than calling through it directly;
    /// the pointer stays valid until the module is unloaded.
    pub fn table(&self, id: ModuleId) -> Option<NonNull<u8>> {
        self.modules.get(&id).map(|h| h.table().as_non_null())
    }

    /// Completion state recorded at load time, `None` when not loaded.
    pub fn state(&self, id: ModuleId) -> Option<CompletionState> {
        self.modules.get(&id).map(ModuleHandle::state)
    }

    pub fn is_loaded(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    /// Number of currently loaded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Force-unload everything still registered.
    ///
    /// Any module still loaded at this point is a leak — the embedding
    /// application forgot an explicit unload — so each one is named in a
    /// warning before being freed. Returns how many were reclaimed; this
    /// is the backstop that guarantees no dangling OS library handles
    /// survive teardown.
    pub fn reset(&mut self) -> usize {
        let mut leaked = 0;
        for (id, handle) in self.modules.drain() {
            tracing::warn!(
                "module {} ({}) was still loaded at reset; forcing unload",
                handle.name(),
                id
            );
            leaked += 1;
        }
        leaked
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModuleManager {
    fn drop(&mut self) {
        if !self.modules.is_empty() {
            self.reset();
        }
    }
}
