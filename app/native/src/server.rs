//! Server lifecycle: marker, channel, render thread and receiver.
//!
//! Startup order:
//!
//! 1. Acquire the PID marker (fails if a server is already running; nothing
//!    else is touched in that case).
//! 2. Create and open the message channel.
//! 3. Start the render loop on its own named thread.
//! 4. Receive messages on the calling thread until end-of-input.
//!
//! The channel and marker are removed by [`Cleanup`] on every exit path: when
//! the [`Server`] is dropped, from the signal handler, and after a fatal display
//! error.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::config::Settings;
use crate::constants::APP_NAME;
use crate::display::DisplaySink;
use crate::error::{Error, Result};
use crate::pidfile::PidFile;
use crate::relay::Relay;
use crate::render::RenderLoop;
use crate::transport::{self, Channel, EndpointPaths};

/// Removes the server's channel and marker exactly once.
#[derive(Debug)]
pub struct Cleanup {
    channel: PathBuf,
    pid_file: PathBuf,
    done: AtomicBool,
}

impl Cleanup {
    /// Creates a cleanup handler for `paths`.
    #[must_use]
    pub fn new(paths: &EndpointPaths) -> Self {
        Self {
            channel: paths.channel.clone(),
            pid_file: paths.pid_file.clone(),
            done: AtomicBool::new(false),
        }
    }

    /// Removes the channel and marker. Later calls do nothing.
    pub fn run(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Err(err) = Channel::remove(&self.channel) {
            tracing::warn!(path = %self.channel.display(), "failed to remove channel: {err}");
        }
        if let Err(err) = PidFile::remove(&self.pid_file) {
            tracing::warn!(path = %self.pid_file.display(), "failed to remove pid marker: {err}");
        }
        tracing::debug!("removed channel and pid marker");
    }
}

/// Installs SIGINT and SIGTERM handlers that clean up and exit with status 1.
///
/// # Errors
///
/// Returns an error if a handler was already installed for this process.
pub fn install_signal_handler(cleanup: Arc<Cleanup>) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("received termination signal, shutting down");
        cleanup.run();
        std::process::exit(1);
    })
    .map_err(|err| Error::other(format!("failed to install signal handler: {err}")))
}

/// A bound server: marker held, channel open, not yet serving.
#[derive(Debug)]
pub struct Server {
    relay: Relay,
    channel: Channel,
    auto_collapse: bool,
    cleanup: Arc<Cleanup>,
    pid_file: PidFile,
}

impl Server {
    /// Acquires the marker and creates the channel at `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if another server holds the marker,
    /// or [`Error::ChannelUnavailable`] if the channel cannot be created. In
    /// the latter case the marker is released again.
    pub fn bind(settings: &Settings, paths: &EndpointPaths) -> Result<Self> {
        let pid_file = PidFile::acquire(&paths.pid_file)?;
        let cleanup = Arc::new(Cleanup::new(paths));
        let channel = Channel::create(&paths.channel)?;
        let relay = Relay::new(settings.slots, settings.ttl);

        tracing::info!(
            channel = %paths.channel.display(),
            slots = settings.slots.get(),
            ttl_secs = relay.ttl().as_secs(),
            "{APP_NAME} server listening"
        );

        Ok(Self {
            relay,
            channel,
            auto_collapse: settings.auto_collapse,
            cleanup,
            pid_file,
        })
    }

    /// Handle to the server's message state.
    #[must_use]
    pub fn relay(&self) -> Relay { self.relay.clone() }

    /// Cleanup handler to hand to the signal handler.
    #[must_use]
    pub fn cleanup(&self) -> Arc<Cleanup> { Arc::clone(&self.cleanup) }

    /// Serves until the channel reaches end-of-input or `display` fails.
    ///
    /// The render loop runs on a separate thread while this thread reads the
    /// channel. If the display fails, the receiver is woken and stopped, and
    /// the display error is returned.
    ///
    /// # Errors
    ///
    /// Returns the display error, a channel read error, or an error if the
    /// render thread cannot be started.
    pub fn serve<D>(mut self, mut display: D) -> Result<()>
    where D: DisplaySink + Send + 'static {
        let render = RenderLoop::new(self.relay.clone(), self.auto_collapse);
        let relay = self.relay.clone();
        let mut waker = self.channel.try_clone()?;

        let render_thread = thread::Builder::new()
            .name(format!("{APP_NAME}-render"))
            .spawn(move || {
                let result = render.run(&mut display);
                if let Err(err) = &result {
                    tracing::error!("render loop failed: {err}");
                    relay.close();
                    // Unblock the receiver, which is waiting on the channel.
                    let _ = waker.write_all(b"\n");
                }
                result
            })?;

        let received = transport::receive_into(&mut self.channel, &self.relay);
        self.relay.close();

        let rendered = render_thread
            .join()
            .map_err(|_| Error::other("render thread panicked"))?;

        tracing::info!(pid_file = %self.pid_file.path().display(), "server stopped");
        rendered?;
        received?;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) { self.cleanup.run(); }
}
