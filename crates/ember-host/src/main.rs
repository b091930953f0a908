//! Demo embedding application for the Ember engine.
//!
//! Boots an [`EngineContext`], optionally registers the bundled stub
//! windowing module as a builtin, runs a fixed number of frames and
//! exits. Mostly useful as a living example of the host-side wiring:
//! settings file, logging bootstrap, argument pass-through, builtin
//! registration and the run loop.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ember_core::{init_logging, ConfigFile, LogSettings};
use ember_engine::{
    Application, EngineConfig, EngineContext, EngineError, Subsystem, WindowConfig,
};
use ember_module_sdk::ApiVersion;

/// Ember demo host.
#[derive(Parser, Debug)]
#[command(name = "ember-host")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run without window or renderer acquisition.
    #[arg(long)]
    headless: bool,

    /// Number of frames to run before quitting.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Directory to search for module libraries. Defaults to the
    /// directory containing this executable.
    #[arg(long)]
    module_dir: Option<PathBuf>,

    /// Settings file for state persisted across runs.
    #[arg(long, default_value = "ember.ini")]
    settings: PathBuf,

    /// Use the bundled stub windowing module instead of loading a
    /// shared library from the module directory.
    #[arg(long)]
    stub_windowing: bool,
}

struct DemoApp {
    frame_budget: u64,
    frames_run: u64,
}

impl Application for DemoApp {
    fn pre_initialize(&mut self, _engine: &mut EngineContext) -> Result<(), EngineError> {
        tracing::info!("demo pre-initialize");
        Ok(())
    }

    fn post_initialize(&mut self, engine: &mut EngineContext) -> Result<(), EngineError> {
        tracing::info!(
            "demo post-initialize, {} module(s) loaded",
            engine.modules().len()
        );
        Ok(())
    }

    fn frame(&mut self, engine: &mut EngineContext) {
        self.frames_run += 1;
        if self.frames_run >= self.frame_budget {
            engine.request_quit();
        }
    }

    fn shutdown(&mut self, _engine: &mut EngineContext) {
        tracing::info!("demo shutting down after {} frame(s)", self.frames_run);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = ConfigFile::load(&args.settings).unwrap_or_default();
    init_logging(&LogSettings::from_config(&settings));

    let config = EngineConfig {
        app_name: "ember-host".to_string(),
        app_version: ApiVersion::new(0, 3, 0),
        headless: args.headless,
        window: WindowConfig {
            title: "Ember Demo".to_string(),
            ..WindowConfig::default()
        },
        module_dir: args.module_dir.clone(),
        settings_path: Some(args.settings.clone()),
        ..EngineConfig::default()
    };

    let mut engine = EngineContext::new(config);
    engine.parse_args(std::env::args());

    if args.stub_windowing && !args.headless {
        engine.register_builtin(
            Subsystem::Windowing,
            ember_windowing_smoke_module::ember_module_entry,
        );
    }

    let mut app = DemoApp {
        frame_budget: args.frames,
        frames_run: 0,
    };

    engine.run(&mut app)?;
    Ok(())
}
