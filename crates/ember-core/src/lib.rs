//! Foundation utilities for the Ember engine.
//!
//! This crate holds the ambient pieces the rest of the engine leans on:
//! the `[section] key=value` settings file used to persist state across
//! runs, and the log-settings layer that maps persisted verbosity toggles
//! onto the `tracing` subscriber.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigFile};
pub use logging::{init_logging, LogSettings};
