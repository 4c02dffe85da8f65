//! Display sink: the line protocol spoken to the external display process.
//!
//! The render loop produces [`Directive`]s; a [`DisplaySink`] writes them out,
//! one per line. [`ProcessDisplay`] feeds the standard input of a spawned
//! display program such as `dzen2`. [`LineDisplay`] writes to any
//! [`Write`] implementation and is what `ProcessDisplay` uses internally.

use std::fmt;
use std::io::{self, LineWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::constants::directives;
use crate::error::{Error, Result};

/// One line of display output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Hide the display.
    Hide,
    /// Show the display.
    Unhide,
    /// Reset the secondary lines.
    Clear,
    /// Set the foreground line.
    Foreground(String),
    /// Show only the foreground line.
    Collapse,
    /// Show the secondary lines too.
    Uncollapse,
    /// Padding for an unused slot.
    Blank,
    /// A secondary (background) line.
    Line(String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hide => f.write_str(directives::HIDE),
            Self::Unhide => f.write_str(directives::UNHIDE),
            Self::Clear => f.write_str(directives::CLEAR),
            Self::Foreground(text) => write!(f, "{}{text}", directives::FOREGROUND),
            Self::Collapse => f.write_str(directives::COLLAPSE),
            Self::Uncollapse => f.write_str(directives::UNCOLLAPSE),
            Self::Blank => f.write_str(directives::BLANK),
            Self::Line(text) => f.write_str(text),
        }
    }
}

/// Destination of rendered frames.
pub trait DisplaySink {
    /// Writes a single directive as one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn write_directive(&mut self, directive: &Directive) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn flush(&mut self) -> io::Result<()>;

    /// Writes a whole frame and flushes it.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered.
    fn write_frame(&mut self, frame: &[Directive]) -> io::Result<()> {
        for directive in frame {
            self.write_directive(directive)?;
        }
        self.flush()
    }
}

/// Line-buffered sink over any writer.
#[derive(Debug)]
pub struct LineDisplay<W: Write> {
    output: LineWriter<W>,
}

impl<W: Write> LineDisplay<W> {
    /// Wraps `output`.
    pub fn new(output: W) -> Self { Self { output: LineWriter::new(output) } }
}

impl<W: Write> DisplaySink for LineDisplay<W> {
    fn write_directive(&mut self, directive: &Directive) -> io::Result<()> {
        writeln!(self.output, "{directive}")
    }

    fn flush(&mut self) -> io::Result<()> { self.output.flush() }
}

/// Sink feeding the standard input of a spawned display process.
#[derive(Debug)]
pub struct ProcessDisplay {
    child: Child,
    input: Option<LineDisplay<ChildStdin>>,
}

impl ProcessDisplay {
    /// Spawns `command` (program followed by its arguments) and hides it.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty, cannot be spawned, or does
    /// not accept the initial hide directive.
    pub fn spawn(command: &[String]) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            return Err(Error::display("display command is empty"));
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| Error::display(format!("failed to start '{program}': {err}")))?;

        let Some(stdin) = child.stdin.take() else {
            return Err(Error::display(format!("'{program}' has no standard input")));
        };

        tracing::info!(pid = child.id(), program = %program, "started display process");

        let mut display = Self { child, input: Some(LineDisplay::new(stdin)) };
        display
            .write_frame(&[Directive::Hide])
            .map_err(|err| Error::display(format!("failed to write to '{program}': {err}")))?;
        Ok(display)
    }

    fn input(&mut self) -> io::Result<&mut LineDisplay<ChildStdin>> {
        self.input
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "display input is closed"))
    }
}

impl DisplaySink for ProcessDisplay {
    fn write_directive(&mut self, directive: &Directive) -> io::Result<()> {
        self.input()?.write_directive(directive)
    }

    fn flush(&mut self) -> io::Result<()> { self.input()?.flush() }
}

impl Drop for ProcessDisplay {
    fn drop(&mut self) {
        // Closing stdin lets well-behaved display programs exit on their own.
        drop(self.input.take());

        match self.child.try_wait() {
            Ok(Some(status)) => tracing::debug!(%status, "display process exited"),
            Ok(None) => {
                if let Err(err) = self.child.kill() {
                    tracing::warn!("failed to stop display process: {err}");
                }
                let _ = self.child.wait();
            }
            Err(err) => tracing::warn!("failed to query display process: {err}"),
        }
    }
}
