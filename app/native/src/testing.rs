//! Mock infrastructure for render tests.
//!
//! Provides a display sink that records every line it receives, so frame
//! sequencing can be asserted without spawning a display process.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut display = RecordingDisplay::default();
//! let lines = display.lines();
//!
//! render.run(&mut display)?;
//! assert_eq!(lines.lock().last().map(String::as_str), Some("^hide()"));
//! ```

#![cfg(test)]

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::display::{Directive, DisplaySink};

/// Display sink recording rendered lines in memory.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    lines: Arc<Mutex<Vec<String>>>,
    frames: usize,
    fail: bool,
}

impl RecordingDisplay {
    /// Creates a sink whose writes always fail, like a display that exited.
    #[must_use]
    pub fn failing() -> Self { Self { fail: true, ..Self::default() } }

    /// Shared handle to the recorded lines.
    #[must_use]
    pub fn lines(&self) -> Arc<Mutex<Vec<String>>> { Arc::clone(&self.lines) }

    /// Number of flushed frames.
    #[must_use]
    pub const fn frames(&self) -> usize { self.frames }
}

impl DisplaySink for RecordingDisplay {
    fn write_directive(&mut self, directive: &Directive) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display exited"));
        }
        self.lines.lock().push(directive.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
