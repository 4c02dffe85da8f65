//! Configuration file types.
//!
//! Every field is optional; missing fields take the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SLOTS, DEFAULT_TTL, display};

/// Root configuration structure for Stackpop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackpopConfig {
    /// Maximum number of messages shown at the same time.
    pub slots: usize,

    /// Seconds a message stays on screen.
    pub ttl_seconds: u64,

    /// Display process settings.
    pub display: DisplayConfig,
}

impl Default for StackpopConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            ttl_seconds: DEFAULT_TTL.as_secs(),
            display: DisplayConfig::default(),
        }
    }
}

/// Display process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Program and arguments of the display process.
    ///
    /// `{lines}` is replaced by the number of secondary lines and a leading
    /// `~` is expanded to the home directory.
    pub command: Vec<String>,

    /// Whether to collapse the display for a single message and expand it
    /// for several.
    pub auto_collapse: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            command: display::DEFAULT_COMMAND.iter().map(ToString::to_string).collect(),
            auto_collapse: true,
        }
    }
}

impl DisplayConfig {
    /// Builds the final argv for a display holding `slots` messages.
    #[must_use]
    pub fn resolve_command(&self, slots: usize) -> Vec<String> {
        let lines = slots.saturating_sub(1).to_string();
        self.command
            .iter()
            .map(|arg| shellexpand::tilde(arg).replace(display::LINES_PLACEHOLDER, &lines))
            .collect()
    }
}
