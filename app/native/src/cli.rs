//! CLI definitions using Clap.
//!
//! Without flags the binary is a client: it reads a message from standard
//! input and forwards it to the running server. `-d` starts the server.

use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};

use crate::config::{self, Overrides};
use crate::constants::{APP_NAME, APP_VERSION, MAX_SLOTS, MAX_TTL_SECONDS};
use crate::display::ProcessDisplay;
use crate::error::{Error, Result};
use crate::logging::Role;
use crate::server::{self, Server};
use crate::transport::{self, Channel, EndpointPaths};

/// Stackpop - stacked, self-expiring notifications.
///
/// Pipe text into `stackpop` to show it. Start the server with `stackpop -d`.
#[derive(Parser, Debug)]
#[command(name = "stackpop")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(after_long_help = r#"Examples:
  stackpop -d -n 5 &                        # Start the server showing up to 5 notifications
  echo "^fg(red)build failed" | stackpop    # Show a notification"#)]
pub struct Cli {
    /// Start the server and listen for notifications.
    #[arg(short = 'd', long = "daemon")]
    pub daemon: bool,

    /// Maximum number of notifications shown at a time.
    #[arg(short = 'n', long = "slots", value_name = "COUNT", value_parser = parse_slots)]
    pub slots: Option<NonZeroUsize>,

    /// Seconds each notification stays on screen.
    #[arg(
        short = 't',
        long = "ttl",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECONDS)
    )]
    pub ttl: Option<u64>,

    /// Read configuration from this file instead of the default locations.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print shell completions for the given shell and exit.
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Execute the selected mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot start or the client cannot reach it.
    pub fn execute(&self) -> Result<()> {
        if let Some(shell) = self.completions {
            Self::print_completions(shell);
            return Ok(());
        }

        if self.daemon {
            self.execute_server()
        } else {
            Self::execute_client()
        }
    }

    /// Overrides taken from the command line.
    #[must_use]
    pub const fn overrides(&self) -> Overrides {
        Overrides { slots: self.slots, ttl_seconds: self.ttl }
    }

    fn print_completions(shell: Shell) {
        let mut cmd = Self::command();
        generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    }

    fn execute_server(&self) -> Result<()> {
        let settings = config::load_config(self.config.as_deref())?.resolve(self.overrides())?;
        let paths = EndpointPaths::for_current_user();

        let server = Server::bind(&settings, &paths)?;
        server::install_signal_handler(server.cleanup())?;

        let display = ProcessDisplay::spawn(&settings.display_command)?;
        server.serve(display)
    }

    fn execute_client() -> Result<()> {
        let paths = EndpointPaths::for_current_user();
        let mut channel = Channel::connect(&paths.channel)?;

        let forwarded = transport::forward(&mut io::stdin().lock(), &mut channel)?;
        tracing::debug!(bytes = forwarded, path = %channel.path().display(), "forwarded message");
        Ok(())
    }
}

fn parse_slots(value: &str) -> std::result::Result<NonZeroUsize, String> {
    let slots: NonZeroUsize =
        value.parse().map_err(|_| format!("expected a number between 1 and {MAX_SLOTS}"))?;
    if slots.get() > MAX_SLOTS {
        return Err(format!("at most {MAX_SLOTS} slots are supported"));
    }
    Ok(slots)
}

/// Renders a usage error, always ending with the usage line.
#[must_use]
pub fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    if rendered.contains("Usage:") {
        return rendered;
    }
    format!("{}\n{}\n", rendered.trim_end(), Cli::command().render_usage())
}

/// Parses the process arguments and runs the selected mode.
///
/// Help and version requests are printed and return `Ok`.
///
/// # Errors
///
/// Returns [`Error::Usage`] for invalid arguments, or the error of the
/// selected mode.
pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print()?;
            return Ok(());
        }
        Err(err) => return Err(Error::Usage(err)),
    };

    let role = if cli.daemon { Role::Server } else { Role::Client };
    crate::logging::init(role);
    cli.execute()
}
