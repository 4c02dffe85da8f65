//! Configuration loading for Stackpop.
//!
//! The configuration file is optional. It supports JSONC (JSON with comments)
//! and is searched for in the following locations, in priority order:
//!
//! 1. `$XDG_CONFIG_HOME/stackpop/config.jsonc` or `config.json`
//! 2. `~/.config/stackpop/config.jsonc` or `config.json`
//! 3. The platform config directory (`dirs::config_dir()`)
//! 4. `~/.stackpop.jsonc` or `~/.stackpop.json`
//!
//! Command-line flags take precedence over the file, which takes precedence
//! over the built-in defaults.

mod types;

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use types::{DisplayConfig, StackpopConfig};

use crate::constants::{APP_NAME, MAX_SLOTS, MAX_TTL_SECONDS, config};
use crate::error::{Error, Result};

/// Values given on the command line, overriding the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Maximum number of resident messages.
    pub slots: Option<NonZeroUsize>,
    /// Message time-to-live in seconds.
    pub ttl_seconds: Option<u64>,
}

/// Validated settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Maximum number of resident messages.
    pub slots: NonZeroUsize,
    /// Time-to-live of every message.
    pub ttl: Duration,
    /// Display program followed by its arguments.
    pub display_command: Vec<String>,
    /// Whether collapse and uncollapse directives are sent.
    pub auto_collapse: bool,
}

impl StackpopConfig {
    /// Applies `overrides` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a slot count or time-to-live that is zero
    /// or above [`MAX_SLOTS`] / [`MAX_TTL_SECONDS`], or an empty display
    /// command.
    pub fn resolve(&self, overrides: Overrides) -> Result<Settings> {
        let slots = match overrides.slots {
            Some(slots) => slots,
            None => NonZeroUsize::new(self.slots)
                .ok_or_else(|| Error::config("slots must be greater than zero"))?,
        };
        if slots.get() > MAX_SLOTS {
            return Err(Error::config(format!("slots must be at most {MAX_SLOTS}")));
        }

        let ttl_seconds = overrides.ttl_seconds.unwrap_or(self.ttl_seconds);
        if ttl_seconds == 0 {
            return Err(Error::config("ttlSeconds must be greater than zero"));
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            return Err(Error::config(format!("ttlSeconds must be at most {MAX_TTL_SECONDS}")));
        }

        let display_command = self.display.resolve_command(slots.get());
        if display_command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(Error::config("display.command must name a program"));
        }

        Ok(Settings {
            slots,
            ttl: Duration::from_secs(ttl_seconds),
            display_command,
            auto_collapse: self.display.auto_collapse,
        })
    }
}

/// Returns the possible configuration file paths in priority order.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in config::CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join(APP_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_NAME));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in config::LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from a specific file.
///
/// Both single-line (`//`) and multi-line (`/* */`) comments are stripped
/// before parsing.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or is not valid.
pub fn load_config_from_path(path: &Path) -> Result<StackpopConfig> {
    let file = fs::File::open(path)
        .map_err(|err| Error::config(format!("failed to read {}: {err}", path.display())))?;
    let reader = json_comments::StripComments::new(file);

    let config = serde_json::from_reader(reader)
        .map_err(|err| Error::config(format!("failed to parse {}: {err}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Otherwise the first existing file from
/// [`config_paths`] is used, falling back to the defaults when none exists.
///
/// # Errors
///
/// Returns [`Error::Config`] if the chosen file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<StackpopConfig> {
    if let Some(path) = path {
        return load_config_from_path(path);
    }

    match config_paths().into_iter().find(|path| path.exists()) {
        Some(path) => load_config_from_path(&path),
        None => Ok(StackpopConfig::default()),
    }
}
