//! Integration tests for the server over a real named pipe.
//!
//! ## Test Coverage
//! - Messages written by clients reach the display
//! - A second server for the same user is refused
//! - Channel and marker are removed when the server stops

use std::io::Write;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use stackpop_lib::Error;
use stackpop_lib::config::Settings;
use stackpop_lib::server::Server;
use stackpop_lib::transport::{Channel, EndpointPaths};

use crate::common::*;

fn settings(slots: usize) -> Settings {
    Settings {
        slots: NonZeroUsize::new(slots).unwrap(),
        ttl: Duration::from_secs(5),
        display_command: vec!["true".to_string()],
        auto_collapse: true,
    }
}

#[test]
fn test_client_messages_reach_display() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), "tester");

    let server = Server::bind(&settings(2), &paths).unwrap();
    let relay = server.relay();
    let buffer = SharedBuffer::default();
    let display = LineDisplay::new(buffer.clone());

    let handle = thread::spawn(move || server.serve(display));

    let mut client = Channel::connect(&paths.channel).unwrap();
    client.write_all(b"^fg(red)first\n").unwrap();
    assert!(wait_for(Duration::from_secs(2), || relay.resident() == vec!["^fg(red)first"]));

    client.write_all(b"second\n").unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        buffer.lines().ends_with(&["^uncollapse()".to_string(), "^fg(red)first".to_string()])
    }));
    assert!(buffer.lines().contains(&"^tw()second".to_string()));

    // Stop the receiver: close the relay, then wake the blocked read.
    relay.close();
    client.write_all(b"\n").unwrap();
    handle.join().unwrap().unwrap();

    assert!(!paths.channel.exists());
    assert!(!paths.pid_file.exists());
}

#[test]
fn test_second_server_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), "tester");

    let first = Server::bind(&settings(3), &paths).unwrap();
    let err = Server::bind(&settings(3), &paths).unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning(_)));

    drop(first);
    assert!(Server::bind(&settings(3), &paths).is_ok());
}

#[test]
fn test_client_without_server_gets_hint() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), "nobody");

    let err = Channel::connect(&paths.channel).unwrap_err();
    assert!(matches!(err, Error::ServerNotRunning { .. }));
}
