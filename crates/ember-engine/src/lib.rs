//! Ember engine host: module substrate, table guards and engine context.
//!
//! The engine composes itself at startup from independently built binary
//! modules. Each subsystem (windowing, input, rendering, audio,
//! filesystem) lives in its own shared library, exposes a fixed-layout
//! capability table through one exported entry symbol, and is loaded,
//! validated and torn down by the substrate in this crate:
//!
//! - [`module`] — identity, lifecycle and the keyed module registry;
//! - [`guard`] — wrappers that make a raw capability table safe to call;
//! - [`context`] — the top-level [`EngineContext`] owning search-path
//!   resolution, subsystem orchestration and the frame loop.
//!
//! A single module failing to load degrades that subsystem only; the
//! process carries on. The one process-fatal condition the substrate
//! knows about is a requested window that cannot be opened.

pub mod app;
pub mod context;
pub mod error;
pub mod guard;
pub mod module;

pub use app::Application;
pub use context::{EngineConfig, EngineContext, QuitHandle, Subsystem, WindowConfig};
pub use error::EngineError;
pub use guard::{AudioGuard, FilesystemGuard, InputGuard, RenderGuard, WindowingGuard};
pub use module::{
    CompletionState, ModuleError, ModuleId, ModuleManager, TableSpec, VersionPolicy,
};
