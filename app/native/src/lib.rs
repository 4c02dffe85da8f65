//! Stackpop - stacked, self-expiring notifications.
//!
//! A long-lived server reads short preformatted messages from a per-user
//! named pipe and shows them through an external display process such as
//! `dzen2`. Up to a configurable number of messages are stacked; each one
//! disappears after a fixed time-to-live unless pushed out by newer ones.
//!
//! Data flows through the crate as follows:
//!
//! - [`transport`] - the named pipe and its receiver
//! - [`relay`] - the shared pending slot and queue, guarded by one lock
//! - [`queue`] - the bounded queue with per-message expiration
//! - [`render`] - the loop that expires, promotes and composes frames
//! - [`display`] - the line protocol written to the display process

pub mod cli;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod logging;
pub mod pidfile;
pub mod queue;
pub mod relay;
pub mod render;
pub mod server;
pub mod transport;

mod testing;

pub use error::{Error, Result};
