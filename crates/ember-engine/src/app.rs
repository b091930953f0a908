//! Lifecycle interface the embedding application implements.

use crate::context::EngineContext;
use crate::error::EngineError;

/// The embedding application, driven by
/// [`EngineContext::run`](crate::EngineContext::run).
///
/// Hook order: `pre_initialize` → window creation → `post_initialize` →
/// `frame`* → `shutdown`. In headless mode the window phase is skipped
/// entirely and `pre_initialize` with it, so headless applications put
/// their setup in `post_initialize`. `shutdown` is always invoked —
/// before any module teardown and even when an initialization hook
/// returned an error.
pub trait Application {
    /// Runs before the main window exists. Non-headless mode only.
    fn pre_initialize(&mut self, engine: &mut EngineContext) -> Result<(), EngineError>;

    /// Runs once window and renderer acquisition is done (or immediately
    /// after startup in headless mode).
    fn post_initialize(&mut self, engine: &mut EngineContext) -> Result<(), EngineError>;

    /// One iteration of the frame loop.
    fn frame(&mut self, engine: &mut EngineContext);

    /// Final hook; always called exactly once per run.
    fn shutdown(&mut self, engine: &mut EngineContext);
}
