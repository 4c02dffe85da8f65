//! Per-user named pipe shared by many clients and one server.
//!
//! The server creates the FIFO and reads raw chunks from it, each chunk
//! becoming one staged message. Clients open the existing FIFO and copy their
//! standard input into it. Writes of at most [`MAX_MESSAGE_SIZE`] bytes are
//! delivered as a single message.

use std::ffi::{CStr, CString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::constants::{MAX_MESSAGE_SIZE, channel};
use crate::error::{Error, Result};
use crate::relay::Relay;

/// Name of the invoking user.
///
/// Looked up in the password database, falling back to `$USER` and finally
/// to the numeric user id.
#[must_use]
pub fn current_user() -> String {
    // SAFETY: getuid never fails. getpwuid returns either null or a pointer to
    // static storage that stays valid until the next getpw* call; the name is
    // copied out immediately.
    let name = unsafe {
        let uid = libc::getuid();
        let entry = libc::getpwuid(uid);
        if entry.is_null() || (*entry).pw_name.is_null() {
            None
        } else {
            Some(CStr::from_ptr((*entry).pw_name).to_string_lossy().into_owned())
        }
    };

    name.filter(|name| !name.is_empty())
        .or_else(|| std::env::var("USER").ok().filter(|user| !user.is_empty()))
        .unwrap_or_else(|| {
            // SAFETY: getuid never fails.
            unsafe { libc::getuid() }.to_string()
        })
}

/// Locations of the per-user channel and PID marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    /// The FIFO messages travel through.
    pub channel: PathBuf,
    /// The marker file holding the server's process id.
    pub pid_file: PathBuf,
}

impl EndpointPaths {
    /// Paths for `user` inside `dir`.
    #[must_use]
    pub fn new(dir: &Path, user: &str) -> Self {
        let name = format!("{}{user}", channel::FILE_PREFIX);
        Self {
            pid_file: dir.join(format!("{name}.{}", channel::PID_EXTENSION)),
            channel: dir.join(name),
        }
    }

    /// Paths for the invoking user in the system temporary directory.
    #[must_use]
    pub fn for_current_user() -> Self { Self::new(&std::env::temp_dir(), &current_user()) }
}

/// An open handle to the FIFO.
#[derive(Debug)]
pub struct Channel {
    file: File,
    path: PathBuf,
}

impl Channel {
    /// Creates the FIFO at `path` (if needed) and opens it for reading.
    ///
    /// An existing FIFO is reused. The handle is opened read-write so the
    /// server never sees end-of-file when the last client disconnects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelUnavailable`] if the FIFO cannot be created or
    /// opened, or if something other than a FIFO occupies `path`.
    pub fn create(path: &Path) -> Result<Self> {
        make_fifo(path).map_err(|err| Error::channel(path, err))?;
        ensure_fifo(path).map_err(|err| Error::channel(path, err))?;
        let file = open_fifo(path).map_err(|err| Error::channel(path, err))?;

        tracing::debug!(path = %path.display(), "message channel ready");
        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Opens the server's existing FIFO for writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerNotRunning`] if no FIFO exists at `path` or it
    /// cannot be opened.
    pub fn connect(path: &Path) -> Result<Self> {
        ensure_fifo(path).map_err(|err| Error::server_not_running(path, err))?;
        let file = open_fifo(path).map_err(|err| Error::server_not_running(path, err))?;
        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Path of the FIFO.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Opens a second handle to the same FIFO.
    ///
    /// # Errors
    ///
    /// Returns an error if the file descriptor cannot be duplicated.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self { file: self.file.try_clone()?, path: self.path.clone() })
    }

    /// Removes the FIFO at `path`. A missing FIFO is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

impl Read for Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { self.file.read(buf) }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.file.write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.file.flush() }
}

fn make_fifo(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o700) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::AlreadyExists {
        tracing::debug!(path = %path.display(), "reusing existing channel");
        return Ok(());
    }
    Err(err)
}

fn ensure_fifo(path: &Path) -> io::Result<()> {
    if fs::metadata(path)?.file_type().is_fifo() {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::InvalidInput, "not a named pipe"))
    }
}

fn open_fifo(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).write(true).open(path)
}

/// Turns one raw chunk into message text.
///
/// Every message is written to the display as exactly one line: invalid UTF-8
/// is replaced, trailing line terminators are dropped and interior line
/// breaks are folded into single spaces.
#[must_use]
pub fn decode_message(chunk: &[u8]) -> String {
    String::from_utf8_lossy(chunk)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads chunks from `reader` and stages each as a message until end-of-file
/// or until `relay` is closed.
///
/// Returns the number of staged messages.
///
/// # Errors
///
/// Returns the first read error other than an interrupted read.
pub fn receive_into(reader: &mut impl Read, relay: &Relay) -> io::Result<usize> {
    let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
    let mut staged = 0;

    while !relay.is_closed() {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };

        let text = decode_message(&buf[..n]);
        if text.is_empty() {
            tracing::trace!("ignoring empty message");
            continue;
        }

        relay.stage(text);
        staged += 1;
    }

    tracing::info!(staged, "stopped receiving messages");
    Ok(staged)
}

/// Copies `input` into `output` in chunks of at most [`MAX_MESSAGE_SIZE`] bytes.
///
/// Returns the number of bytes forwarded.
///
/// # Errors
///
/// Returns the first read or write error other than an interrupted read.
pub fn forward(input: &mut impl Read, output: &mut impl Write) -> io::Result<usize> {
    let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
    let mut total = 0;

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };

        output.write_all(&buf[..n])?;
        total += n;
    }

    output.flush()?;
    Ok(total)
}
