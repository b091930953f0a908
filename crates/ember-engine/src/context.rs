//! The engine context: subsystem orchestration and the frame loop.

use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ember_core::{ConfigFile, LogSettings};
use ember_module_sdk::{
    module_file_name, ApiVersion, AudioTable, FilesystemTable, InputTable, ModuleEntryFn,
    RenderTable, ResultCode, WindowDesc, WindowHandle, WindowingTable, INVALID_WINDOW,
};

use crate::app::Application;
use crate::error::EngineError;
use crate::guard::{AudioGuard, FilesystemGuard, InputGuard, RenderGuard, WindowingGuard};
use crate::module::{CompletionState, ModuleError, ModuleId, ModuleManager, TableSpec, VersionPolicy};

/// The five subsystems the engine knows how to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Windowing,
    Renderer,
    Input,
    Audio,
    Filesystem,
}

impl Subsystem {
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Windowing,
        Subsystem::Renderer,
        Subsystem::Input,
        Subsystem::Audio,
        Subsystem::Filesystem,
    ];

    /// Canonical module base name; the platform library file name and
    /// the module id both derive from this.
    pub const fn module_base(self) -> &'static str {
        match self {
            Subsystem::Windowing => "ember_windowing",
            Subsystem::Renderer => "ember_renderer",
            Subsystem::Input => "ember_input",
            Subsystem::Audio => "ember_audio",
            Subsystem::Filesystem => "ember_filesystem",
        }
    }

    /// Registry key for this subsystem's module.
    pub fn module_id(self) -> ModuleId {
        ModuleId::from_name(self.module_base())
    }

    fn table_spec(self) -> TableSpec {
        match self {
            Subsystem::Windowing => TableSpec::of::<WindowingTable>(),
            Subsystem::Renderer => TableSpec::of::<RenderTable>(),
            Subsystem::Input => TableSpec::of::<InputTable>(),
            Subsystem::Audio => TableSpec::of::<AudioTable>(),
            Subsystem::Filesystem => TableSpec::of::<FilesystemTable>(),
        }
    }
}

/// Main window parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Ember Application".to_string(),
            fullscreen: false,
        }
    }
}

/// Startup parameters for an [`EngineContext`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub app_name: String,
    pub app_version: ApiVersion,
    /// Skip window/renderer acquisition entirely.
    pub headless: bool,
    pub window: WindowConfig,
    /// How api-version mismatches in module tables are handled.
    pub version_policy: VersionPolicy,
    /// Where module libraries are searched. Defaults to the directory
    /// containing the running executable.
    pub module_dir: Option<PathBuf>,
    /// Settings file for state persisted across runs (log verbosity).
    /// Absent means nothing is persisted.
    pub settings_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "ember-app".to_string(),
            app_version: ApiVersion::new(0, 1, 0),
            headless: false,
            window: WindowConfig::default(),
            version_policy: VersionPolicy::default(),
            module_dir: None,
            settings_path: None,
        }
    }
}

/// Cloneable handle over the engine's running flag.
///
/// The flag is the one piece of engine state that may be observed and
/// cleared from outside the frame loop, which is why it is atomic while
/// everything else in the substrate is single-threaded.
#[derive(Clone)]
pub struct QuitHandle {
    running: Arc<AtomicBool>,
}

impl QuitHandle {
    /// Ask the frame loop to stop after the current iteration.
    pub fn request_quit(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Top-level owner of the module substrate.
///
/// Explicitly constructed and explicitly owned by the embedding
/// application — there is no process-wide instance. The context resolves
/// the module search directory, drives each subsystem load through its
/// [`ModuleManager`], hands out table guards via the per-subsystem
/// accessors, runs the frame loop and performs orderly teardown. Its
/// lifetime is the application run: initialized once, torn down once.
pub struct EngineContext {
    config: EngineConfig,
    args: Vec<String>,
    module_dir: PathBuf,
    builtins: HashMap<ModuleId, ModuleEntryFn>,
    // Guards are declared before the manager so they drop first; their
    // function pointers reference tables the manager owns.
    windowing: Option<WindowingGuard>,
    renderer: Option<RenderGuard>,
    input: Option<InputGuard>,
    audio: Option<AudioGuard>,
    filesystem: Option<FilesystemGuard>,
    main_window: WindowHandle,
    modules: ModuleManager,
    running: Arc<AtomicBool>,
    log_settings: LogSettings,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        let module_dir = config.module_dir.clone().unwrap_or_else(executable_dir);

        let log_settings = match &config.settings_path {
            Some(path) => match ConfigFile::load(path) {
                Ok(file) => LogSettings::from_config(&file),
                // Load failure is non-fatal; first run has no file yet.
                Err(_) => LogSettings::default(),
            },
            None => LogSettings::default(),
        };

        tracing::info!(
            "initializing engine, app={} version={}",
            config.app_name,
            config.app_version
        );

        let modules = ModuleManager::with_version_policy(config.version_policy);

        Self {
            config,
            args: Vec::new(),
            module_dir,
            modules,
            builtins: HashMap::new(),
            windowing: None,
            renderer: None,
            input: None,
            audio: None,
            filesystem: None,
            main_window: INVALID_WINDOW,
            running: Arc::new(AtomicBool::new(false)),
            log_settings,
        }
    }

    /// Record the process arguments as an ordered list, logging each
    /// one. No flag semantics live at this layer — interpretation is the
    /// embedding application's business.
    pub fn parse_args(&mut self, args: impl IntoIterator<Item = String>) {
        for arg in args {
            tracing::info!("parsed command argument {}", arg);
            self.args.push(arg);
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Directory module libraries are resolved in.
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    pub fn log_settings(&self) -> &LogSettings {
        &self.log_settings
    }

    /// Mutable access so the application can toggle verbosity; the
    /// settings are written back when the context is dropped.
    pub fn log_settings_mut(&mut self) -> &mut LogSettings {
        &mut self.log_settings
    }

    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Ask the frame loop to stop after the current iteration.
    pub fn request_quit(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Use an in-process entry function for a subsystem instead of
    /// searching for its shared library. Must happen before the
    /// subsystem loads; hosts that statically link a module use this,
    /// and so do tests.
    pub fn register_builtin(&mut self, subsystem: Subsystem, entry: ModuleEntryFn) {
        self.builtins.insert(subsystem.module_id(), entry);
    }

    /// Load one subsystem's module and wrap its table in a guard.
    ///
    /// Prefers a registered builtin; otherwise resolves the module's
    /// conventional file name relative to [`module_dir`]. A failure
    /// leaves that subsystem's accessor `None` and degrades nothing
    /// else.
    ///
    /// [`module_dir`]: EngineContext::module_dir
    pub fn load_subsystem(&mut self, subsystem: Subsystem) -> Result<CompletionState, ModuleError> {
        let id = subsystem.module_id();
        let spec = subsystem.table_spec();

        let state = match self.builtins.get(&id).copied() {
            Some(entry) => self
                .modules
                .load_builtin(subsystem.module_base(), id, entry, spec)?,
            None => {
                let path = self
                    .module_dir
                    .join(module_file_name(subsystem.module_base()));
                self.modules.load(&path, id, spec)?
            }
        };

        if let Some(ptr) = self.modules.table(id) {
            // SAFETY: the buffer behind `ptr` was filled with this
            // subsystem's table type by the load above, and the module
            // stays loaded for as long as the guard is held (guards are
            // dropped in teardown before their modules unload).
            unsafe {
                match subsystem {
                    Subsystem::Windowing => self.windowing = Some(WindowingGuard::from_raw(ptr)),
                    Subsystem::Renderer => self.renderer = Some(RenderGuard::from_raw(ptr)),
                    Subsystem::Input => self.input = Some(InputGuard::from_raw(ptr)),
                    Subsystem::Audio => self.audio = Some(AudioGuard::from_raw(ptr)),
                    Subsystem::Filesystem => self.filesystem = Some(FilesystemGuard::from_raw(ptr)),
                }
            }
        }

        Ok(state)
    }

    /// Completion state of a subsystem's module, `None` when not loaded.
    pub fn subsystem_state(&self, subsystem: Subsystem) -> Option<CompletionState> {
        self.modules.state(subsystem.module_id())
    }

    pub fn windowing(&self) -> Option<&WindowingGuard> {
        self.windowing.as_ref()
    }

    pub fn renderer(&self) -> Option<&RenderGuard> {
        self.renderer.as_ref()
    }

    pub fn input(&self) -> Option<&InputGuard> {
        self.input.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioGuard> {
        self.audio.as_ref()
    }

    pub fn filesystem(&self) -> Option<&FilesystemGuard> {
        self.filesystem.as_ref()
    }

    /// Handle of the main window, [`INVALID_WINDOW`] when none exists.
    pub fn main_window(&self) -> WindowHandle {
        self.main_window
    }

    pub fn modules(&self) -> &ModuleManager {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleManager {
        &mut self.modules
    }

    /// Drive the application through its whole lifecycle.
    ///
    /// `pre_initialize` → window creation → `post_initialize` →
    /// `frame`* → `shutdown`, with the window phase (and
    /// `pre_initialize`) skipped in headless mode. The loop runs until
    /// the running flag clears — either the application requested quit
    /// or the windowing module reported the main window closed.
    /// `shutdown` and module teardown run on every exit path, including
    /// failed initialization hooks.
    pub fn run(&mut self, app: &mut dyn Application) -> Result<(), EngineError> {
        self.running.store(true, Ordering::Release);

        let result = self.run_phases(app);
        if let Err(err) = &result {
            tracing::error!("engine run failed: {}", err);
        }

        app.shutdown(self);
        self.teardown();

        result
    }

    fn run_phases(&mut self, app: &mut dyn Application) -> Result<(), EngineError> {
        if !self.config.headless {
            self.load_subsystem(Subsystem::Windowing)?;
            app.pre_initialize(self)?;
            self.open_main_window()?;
        }

        app.post_initialize(self)?;

        while self.running.load(Ordering::Acquire) {
            app.frame(self);

            if !self.config.headless {
                self.pump_window();
            }
        }

        Ok(())
    }

    fn open_main_window(&mut self) -> Result<(), EngineError> {
        let title = CString::new(self.config.window.title.as_str()).unwrap_or_default();
        let desc = WindowDesc {
            width: self.config.window.width,
            height: self.config.window.height,
            title: title.as_ptr(),
            fullscreen: self.config.window.fullscreen as u32,
        };

        let Some(guard) = self.windowing.as_ref() else {
            return Err(EngineError::WindowCreation(ResultCode::Incomplete));
        };

        match guard.create_window(&desc) {
            Ok(window) => {
                self.main_window = window;
                Ok(())
            }
            Err(code) => {
                tracing::error!("a window was requested, but could not be opened");
                Err(EngineError::WindowCreation(code))
            }
        }
    }

    fn pump_window(&self) {
        let Some(guard) = self.windowing.as_ref() else {
            return;
        };
        if self.main_window == INVALID_WINDOW {
            return;
        }

        let _ = guard.poll_events(self.main_window);

        // Err means the module cannot answer; treat the window as still
        // open rather than tearing down a running application.
        if let Ok(false) = guard.window_is_open(self.main_window) {
            tracing::info!("main window closed; stopping");
            self.running.store(false, Ordering::Release);
        }
    }

    fn teardown(&mut self) {
        if self.main_window != INVALID_WINDOW {
            if let Some(guard) = self.windowing.as_ref() {
                let _ = guard.destroy_window(self.main_window);
            }
            self.main_window = INVALID_WINDOW;
        }

        // Guards hold pointers into module-owned tables; drop them
        // before the modules go.
        self.windowing = None;
        self.renderer = None;
        self.input = None;
        self.audio = None;
        self.filesystem = None;

        for subsystem in Subsystem::ALL {
            self.modules.unload(subsystem.module_id());
        }
        // Anything the embedding application loaded and forgot gets
        // warned about and reclaimed here.
        self.modules.reset();

        self.args.clear();
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        let Some(path) = self.config.settings_path.clone() else {
            return;
        };

        let mut file = ConfigFile::load(&path).unwrap_or_default();
        self.log_settings.store(&mut file);
        if let Err(err) = file.save(&path) {
            tracing::error!("failed to save engine settings: {}", err);
        }
    }
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_module_sdk::{entry_with, CapabilityTable, RawCode};

    fn build_audio() -> (AudioTable, ResultCode) {
        unsafe extern "C" fn play(_sound: u32) -> RawCode {
            ResultCode::Ok.into_raw()
        }
        unsafe extern "C" fn stop(_sound: u32) -> RawCode {
            ResultCode::Ok.into_raw()
        }
        unsafe extern "C" fn set_volume(_volume: f32) -> RawCode {
            ResultCode::Ok.into_raw()
        }

        (
            AudioTable {
                api_version: AudioTable::API_VERSION.pack(),
                play: Some(play),
                stop: Some(stop),
                set_volume: Some(set_volume),
            },
            ResultCode::Ok,
        )
    }

    unsafe extern "C" fn audio_entry(table: *mut u8, table_size: usize) -> RawCode {
        unsafe { entry_with(table, table_size, build_audio) }
    }

    fn headless_config() -> EngineConfig {
        EngineConfig {
            headless: true,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_module_dir_override() {
        let config = EngineConfig {
            module_dir: Some(PathBuf::from("/opt/ember/modules")),
            ..headless_config()
        };
        let engine = EngineContext::new(config);
        assert_eq!(engine.module_dir(), Path::new("/opt/ember/modules"));
    }

    #[test]
    fn test_parse_args_preserves_order() {
        let mut engine = EngineContext::new(headless_config());
        engine.parse_args(["demo".to_string(), "--flag".to_string(), "value".to_string()]);
        assert_eq!(engine.args(), ["demo", "--flag", "value"]);
    }

    #[test]
    fn test_builtin_subsystem_load() {
        let mut engine = EngineContext::new(headless_config());
        engine.register_builtin(Subsystem::Audio, audio_entry);

        let state = engine.load_subsystem(Subsystem::Audio).unwrap();
        assert_eq!(state, CompletionState::Complete);
        assert_eq!(
            engine.subsystem_state(Subsystem::Audio),
            Some(CompletionState::Complete)
        );

        let audio = engine.audio().unwrap();
        assert!(audio.is_complete());
        assert_eq!(audio.play(3), ResultCode::Ok);
    }

    #[test]
    fn test_missing_module_file_degrades_subsystem_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            module_dir: Some(dir.path().to_path_buf()),
            ..headless_config()
        };
        let mut engine = EngineContext::new(config);

        let err = engine.load_subsystem(Subsystem::Renderer).unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::LoadLibraryFailed));
        assert!(engine.renderer().is_none());
        assert!(engine.modules().is_empty());
    }

    #[test]
    fn test_quit_handle() {
        let engine = EngineContext::new(headless_config());
        let handle = engine.quit_handle();
        assert!(!handle.is_running());

        engine.running.store(true, Ordering::Release);
        handle.request_quit();
        assert!(!engine.running.load(Ordering::Acquire));
    }
}
