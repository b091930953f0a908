//! Plain-text settings file with `[section]` headers and `key=value` lines.
//!
//! The format is deliberately small: section headers in brackets,
//! `key=value` pairs, `;` or `#` comment lines, surrounding whitespace
//! ignored. Keys that appear before any header land in the `default`
//! section. Load failure is non-fatal by design — callers fall back to
//! their defaults and the file is recreated on the next save.

use std::fmt;
use std::fs;
use std::path::Path;

/// Section used for keys that appear before any `[section]` header.
pub const DEFAULT_SECTION: &str = "default";

/// Errors from reading or writing a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    /// The file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
struct Entry {
    section: String,
    key: String,
    value: String,
}

/// Ordered section/key/value store.
///
/// Entries keep their insertion order; saving groups them under their
/// section headers in first-seen section order. Unparseable lines are
/// skipped rather than failing the whole file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    entries: Vec<Entry>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a settings file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref()).map_err(ConfigError::Read)?;
        let config = Self::parse(&text);
        tracing::debug!("loaded config file {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse settings from an in-memory string. Never fails; malformed
    /// lines are dropped.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::new();
        let mut section = DEFAULT_SECTION.to_string();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                if let Some(name) = rest.strip_suffix(']') {
                    section = name.trim().to_string();
                }
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.set(&section, key.trim(), value.trim());
            }
        }

        config
    }

    /// Write all entries back to disk, grouped by section.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_string()).map_err(ConfigError::Write)?;
        tracing::debug!("saved config file {}", path.as_ref().display());
        Ok(())
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.section == section && e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Look up a value, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Look up a boolean. Accepts `1`/`0` and `true`/`false`.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get(section, key) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    /// Insert or overwrite a value.
    pub fn set(&mut self, section: &str, key: &str, value: impl fmt::Display) {
        let value = value.to_string();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.section == section && e.key == key)
        {
            entry.value = value;
            return;
        }

        self.entries.push(Entry {
            section: section.to_string(),
            key: key.to_string(),
            value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sections in first-seen order.
    fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !sections.contains(&entry.section.as_str()) {
                sections.push(&entry.section);
            }
        }
        sections
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in self.sections() {
            writeln!(f, "[{}]", section)?;
            for entry in self.entries.iter().filter(|e| e.section == section) {
                writeln!(f, "{}={}", entry.key, entry.value)?;
            }
        }
        Ok(())
    }
}
