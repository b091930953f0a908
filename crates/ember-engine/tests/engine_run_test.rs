//! End-to-end tests of the engine context lifecycle.

use std::path::PathBuf;
use std::sync::Mutex;

use ember_core::ConfigFile;
use ember_engine::{
    Application, CompletionState, EngineConfig, EngineContext, EngineError, QuitHandle, Subsystem,
    WindowConfig,
};
use ember_module_sdk::{ResultCode, WindowHandle, INVALID_WINDOW};
use ember_windowing_smoke_module as smoke;

// The smoke module's window state is process-global; tests driving it
// serialize on this lock.
static SMOKE_LOCK: Mutex<()> = Mutex::new(());

fn lock_smoke() -> std::sync::MutexGuard<'static, ()> {
    SMOKE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct ScriptedApp {
    events: Vec<&'static str>,
    frames: u64,
    quit_after: Option<u64>,
    close_window_on_frame: Option<u64>,
    fail_post_initialize: bool,
    window_at_pre: Option<WindowHandle>,
    window_at_post: Option<WindowHandle>,
    quit_handle: Option<QuitHandle>,
}

impl Application for ScriptedApp {
    fn pre_initialize(&mut self, engine: &mut EngineContext) -> Result<(), EngineError> {
        self.events.push("pre");
        self.window_at_pre = Some(engine.main_window());
        Ok(())
    }

    fn post_initialize(&mut self, engine: &mut EngineContext) -> Result<(), EngineError> {
        self.events.push("post");
        self.window_at_post = Some(engine.main_window());
        self.quit_handle = Some(engine.quit_handle());

        if self.fail_post_initialize {
            return Err(EngineError::app("scripted post-initialize failure"));
        }
        Ok(())
    }

    fn frame(&mut self, engine: &mut EngineContext) {
        self.frames += 1;

        if let Some(at) = self.close_window_on_frame {
            if self.frames == at {
                smoke::close_window(engine.main_window());
            }
        }

        if let Some(after) = self.quit_after {
            if self.frames >= after {
                // Quit through the externally shareable handle; it is
                // the same flag an asynchronous requester would clear.
                if let Some(handle) = &self.quit_handle {
                    handle.request_quit();
                }
            }
        }
    }

    fn shutdown(&mut self, _engine: &mut EngineContext) {
        self.events.push("shutdown");
    }
}

fn headless_config() -> EngineConfig {
    EngineConfig {
        headless: true,
        ..EngineConfig::default()
    }
}

fn windowed_config() -> EngineConfig {
    EngineConfig {
        headless: false,
        window: WindowConfig {
            title: "engine test".to_string(),
            ..WindowConfig::default()
        },
        ..EngineConfig::default()
    }
}

#[test]
fn test_headless_run_skips_pre_initialize() {
    let mut engine = EngineContext::new(headless_config());
    let mut app = ScriptedApp {
        quit_after: Some(3),
        ..ScriptedApp::default()
    };

    engine.run(&mut app).unwrap();

    // Headless mode skips window acquisition entirely, and with it the
    // pre-window hook.
    assert_eq!(app.events, ["post", "shutdown"]);
    assert_eq!(app.frames, 3);
    assert!(engine.modules().is_empty());
    assert!(engine.windowing().is_none());
}

#[test]
fn test_windowed_run_lifecycle() {
    let _lock = lock_smoke();
    smoke::reset_module_state();

    let mut engine = EngineContext::new(windowed_config());
    engine.register_builtin(Subsystem::Windowing, smoke::ember_module_entry);

    let mut app = ScriptedApp {
        quit_after: Some(2),
        ..ScriptedApp::default()
    };

    engine.run(&mut app).unwrap();

    assert_eq!(app.events, ["pre", "post", "shutdown"]);
    assert_eq!(app.frames, 2);

    // The window exists between pre and post, and is gone after
    // teardown along with the module that issued it.
    assert_eq!(app.window_at_pre, Some(INVALID_WINDOW));
    assert_ne!(app.window_at_post, Some(INVALID_WINDOW));
    assert_eq!(smoke::live_window_count(), 0);
    assert!(engine.modules().is_empty());
}

#[test]
fn test_window_close_stops_loop() {
    let _lock = lock_smoke();
    smoke::reset_module_state();

    let mut engine = EngineContext::new(windowed_config());
    engine.register_builtin(Subsystem::Windowing, smoke::ember_module_entry);

    // The app never requests quit; the loop ends because the windowing
    // module reports the main window closed.
    let mut app = ScriptedApp {
        close_window_on_frame: Some(1),
        ..ScriptedApp::default()
    };

    engine.run(&mut app).unwrap();

    assert_eq!(app.frames, 1);
    assert_eq!(app.events, ["pre", "post", "shutdown"]);
    assert_eq!(smoke::live_window_count(), 0);
}

#[test]
fn test_failed_post_initialize_still_tears_down() {
    let _lock = lock_smoke();
    smoke::reset_module_state();

    let mut engine = EngineContext::new(windowed_config());
    engine.register_builtin(Subsystem::Windowing, smoke::ember_module_entry);

    let mut app = ScriptedApp {
        fail_post_initialize: true,
        ..ScriptedApp::default()
    };

    let err = engine.run(&mut app).unwrap_err();
    assert!(matches!(err, EngineError::Application(_)));

    // No frame ran, but shutdown was invoked and module teardown
    // happened anyway: no window and no module survives.
    assert_eq!(app.frames, 0);
    assert_eq!(app.events, ["pre", "post", "shutdown"]);
    assert_eq!(smoke::live_window_count(), 0);
    assert!(engine.modules().is_empty());
}

#[test]
fn test_incomplete_windowing_module_degrades() {
    let _lock = lock_smoke();
    smoke::reset_module_state();

    let mut engine = EngineContext::new(headless_config());
    engine.register_builtin(Subsystem::Windowing, smoke::incomplete_entry);

    let state = engine.load_subsystem(Subsystem::Windowing).unwrap();
    assert_eq!(state, CompletionState::Incomplete);

    let guard = engine.windowing().unwrap();
    assert_eq!(guard.state(), CompletionState::Incomplete);
    assert_eq!(guard.missing(), ["poll_events", "window_is_open", "set_title"]);

    // The provided functions work normally.
    let title = std::ffi::CString::new("degraded").unwrap();
    let desc = ember_module_sdk::WindowDesc {
        width: 100,
        height: 100,
        title: title.as_ptr(),
        fullscreen: 0,
    };
    let window = guard.create_window(&desc).unwrap();
    assert_ne!(window, INVALID_WINDOW);

    // The missing one reports the sentinel instead of crashing.
    assert_eq!(guard.poll_events(window), ResultCode::Incomplete);

    assert_eq!(guard.destroy_window(window), ResultCode::Ok);
}

#[test]
fn test_log_settings_persist_across_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path: PathBuf = dir.path().join("ember.ini");

    {
        let config = EngineConfig {
            settings_path: Some(settings_path.clone()),
            ..headless_config()
        };
        let mut engine = EngineContext::new(config);
        engine.log_settings_mut().enable_debug = true;
        engine.log_settings_mut().enable_location = true;
        // Dropping the context writes the settings back.
    }

    let file = ConfigFile::load(&settings_path).unwrap();
    assert_eq!(file.get("engine.log", "enable_debug"), Some("1"));
    assert_eq!(file.get("engine.log", "enable_location"), Some("1"));

    let config = EngineConfig {
        settings_path: Some(settings_path),
        ..headless_config()
    };
    let engine = EngineContext::new(config);
    assert!(engine.log_settings().enable_debug);
    assert!(engine.log_settings().enable_location);
}
