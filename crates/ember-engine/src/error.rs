//! Engine-level errors.

use ember_module_sdk::ResultCode;

use crate::module::ModuleError;

/// Errors surfaced by [`EngineContext::run`](crate::EngineContext::run).
///
/// Module failures are fatal here only when the embedding application
/// treats the subsystem as mandatory — the context itself promotes just
/// one of them: the windowing module in non-headless mode, because a
/// requested window that cannot exist aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A subsystem the run required failed to load.
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// A window was requested but could not be opened.
    #[error("a window was requested but could not be opened ({0})")]
    WindowCreation(ResultCode),

    /// The embedding application failed one of its lifecycle hooks.
    #[error("application error: {0}")]
    Application(String),
}

impl EngineError {
    /// An application-side failure with a plain message.
    pub fn app(message: impl Into<String>) -> Self {
        EngineError::Application(message.into())
    }
}
