//! Error types for Stackpop.
//!
//! This module provides the unified error type used throughout the application.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum Error {
    /// A server for this user is already running (its PID marker exists).
    #[error("{} is already running (marker file {} exists)", crate::constants::APP_NAME, .0.display())]
    AlreadyRunning(PathBuf),

    /// The server could not create or open its message channel.
    #[error("couldn't open channel {}: {source}", .path.display())]
    ChannelUnavailable {
        /// Path of the channel.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The client found no channel to write to.
    #[error(
        "couldn't open channel {}: {source}\n\"{} -d\" probably isn't running.",
        .path.display(),
        crate::constants::APP_NAME
    )]
    ServerNotRunning {
        /// Path of the channel.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The display process could not be started or written to.
    #[error("Display error: {0}")]
    Display(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command-line usage error, rendered by clap.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }

    /// Creates a display error.
    pub fn display(msg: impl Into<String>) -> Self { Self::Display(msg.into()) }

    /// Creates a generic error.
    pub fn other(msg: impl Into<String>) -> Self { Self::Other(msg.into()) }

    /// Creates a channel error for the server side.
    pub fn channel(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ChannelUnavailable { path: path.into(), source }
    }

    /// Creates a channel error for the client side, suggesting to start the server.
    pub fn server_not_running(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ServerNotRunning { path: path.into(), source }
    }
}
