//! Stackpop - stacked, self-expiring notifications.
//!
//! This binary serves as both the server and the client:
//! - When called with `-d`: runs the server, rendering notifications
//! - Otherwise: forwards standard input to the running server

// Named pipes and the password database are POSIX-only.
#[cfg(not(unix))]
compile_error!("Stackpop only supports Unix-like systems.");

use stackpop_lib::Error;

fn main() {
    if let Err(err) = stackpop_lib::cli::run() {
        match err {
            Error::Usage(usage) => eprint!("{}", stackpop_lib::cli::usage_message(&usage)),
            other => eprintln!("stackpop: {other}"),
        }
        std::process::exit(1);
    }
}
