//! Tracing setup shared by the client and the server.
//!
//! Output always goes to stderr: the client's stdout belongs to the shell and
//! the server's display gets its own pipe. `RUST_LOG` overrides the defaults,
//! e.g. `RUST_LOG=stackpop_lib::render=trace stackpop -d`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Which side of the channel is logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// One-shot client forwarding standard input.
    Client,
    /// Long-lived server rendering notifications.
    Server,
}

impl Role {
    /// Filter used when `RUST_LOG` is unset.
    ///
    /// Clients stay quiet unless something goes wrong. Servers report their
    /// lifecycle, and every relay step in debug builds.
    #[must_use]
    pub const fn default_directives(self) -> &'static str {
        match self {
            Self::Client => "warn",
            Self::Server if cfg!(debug_assertions) => "warn,stackpop_lib=debug",
            Self::Server => "warn,stackpop_lib=info",
        }
    }
}

/// Installs the global subscriber for `role`.
///
/// Does nothing if a subscriber is already installed.
pub fn init(role: Role) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(role.default_directives()));

    // The receiver and render loop run on separate threads, so name them.
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_names(role == Role::Server)
        .with_file(false)
        .with_line_number(false)
        .compact();

    if tracing_subscriber::registry().with(filter).with(layer).try_init().is_ok() {
        tracing::debug!(?role, "logging initialized");
    }
}
