//! Application constants for Stackpop.
//!
//! This module contains global constants used throughout the application,
//! including the application name, channel naming, size limits and the
//! display directive vocabulary.

use std::time::Duration;

/// The application name.
pub const APP_NAME: &str = "stackpop";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of bytes delivered as a single message.
///
/// Larger writes are split by the channel reader into several messages.
pub const MAX_MESSAGE_SIZE: usize = 8192;

/// Default number of messages resident at the same time.
pub const DEFAULT_SLOTS: usize = 3;

/// Default time-to-live of a message once it is staged.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Largest accepted number of slots.
///
/// Every slot is a display line, so anything beyond a screenful is a mistake.
pub const MAX_SLOTS: usize = 256;

/// Largest accepted time-to-live, in seconds (one day).
pub const MAX_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Per-user channel and marker file naming.
pub mod channel {
    /// Prefix of the per-user FIFO and PID marker file names.
    ///
    /// Files are hidden dotfiles in the temporary directory, e.g.
    /// `/tmp/.stackpop-alice` and `/tmp/.stackpop-alice.pid`.
    pub const FILE_PREFIX: &str = ".stackpop-";

    /// Extension of the PID marker file.
    pub const PID_EXTENSION: &str = "pid";
}

/// Control strings understood by the display process.
///
/// These are written verbatim, one per line. The relay never parses them.
pub mod directives {
    /// Hides the display window.
    pub const HIDE: &str = "^hide()";

    /// Shows the display window again.
    pub const UNHIDE: &str = "^unhide()";

    /// Clears the secondary lines.
    pub const CLEAR: &str = "^cs()";

    /// Prefix that sets the foreground (title) line.
    pub const FOREGROUND: &str = "^tw()";

    /// Collapses the display to the foreground line only.
    pub const COLLAPSE: &str = "^collapse()";

    /// Expands the display to show the secondary lines.
    pub const UNCOLLAPSE: &str = "^uncollapse()";

    /// Padding line for unused slots.
    pub const BLANK: &str = " ";
}

/// Display process defaults.
pub mod display {
    /// Placeholder substituted with the number of secondary lines.
    pub const LINES_PLACEHOLDER: &str = "{lines}";

    /// Default display command.
    pub const DEFAULT_COMMAND: &[&str] = &["dzen2", "-l", LINES_PLACEHOLDER];
}

/// Configuration file names.
pub mod config {
    /// Primary config file names (in priority order).
    pub const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

    /// Legacy config file names in the home directory.
    pub const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".stackpop.jsonc", ".stackpop.json"];
}
