//! Integration tests for the `stackpop` binary.
//!
//! Each test points `TMPDIR` at its own temporary directory so the per-user
//! channel and marker never collide with a real server.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use stackpop_lib::transport::{EndpointPaths, current_user};

use crate::common::*;

fn stackpop(tmp: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stackpop"));
    cmd.env("TMPDIR", tmp).env("XDG_CONFIG_HOME", tmp).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_zero_slots_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackpop(dir.path()).args(["-d", "-n", "0"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_non_numeric_slots_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackpop(dir.path()).args(["-d", "-n", "lots"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: stackpop"));
}

#[test]
fn test_out_of_range_values_are_rejected_before_startup() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), &current_user());

    for args in [["-d", "-n", "18446744073709551615"], ["-d", "-t", "18446744073709551615"]] {
        let output = stackpop(dir.path()).args(args).output().unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: stackpop"));
        assert!(!paths.channel.exists());
        assert!(!paths.pid_file.exists());
    }
}

#[test]
fn test_help_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackpop(dir.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--daemon"));
}

#[test]
fn test_client_without_server_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackpop(dir.path()).stdin(Stdio::null()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("stackpop -d"));
}

#[test]
fn test_server_already_running_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), &current_user());
    fs::write(&paths.pid_file, "1").unwrap();

    let output = stackpop(dir.path()).arg("-d").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already running"));
    assert!(!paths.channel.exists());
    assert!(paths.pid_file.exists());
}

#[test]
fn test_server_relays_and_cleans_up_on_sigterm() {
    let dir = tempfile::tempdir().unwrap();
    let paths = EndpointPaths::new(dir.path(), &current_user());
    let display_log = dir.path().join("display.log");

    let config_dir = dir.path().join("stackpop");
    fs::create_dir_all(&config_dir).unwrap();
    let config = serde_json::json!({
        "ttlSeconds": 30,
        "display": {
            "command": ["sh", "-c", format!("cat > '{}'", display_log.display())]
        }
    });
    fs::write(config_dir.join("config.json"), config.to_string()).unwrap();

    let mut server = stackpop(dir.path()).arg("-d").stderr(Stdio::null()).spawn().unwrap();
    assert!(wait_for(Duration::from_secs(5), || paths.channel.exists()));

    let mut client = stackpop(dir.path()).stdin(Stdio::piped()).spawn().unwrap();
    client.stdin.take().unwrap().write_all(b"hello from a test\n").unwrap();
    assert!(client.wait().unwrap().success());

    assert!(wait_for(Duration::from_secs(5), || {
        fs::read_to_string(&display_log).is_ok_and(|log| log.contains("^tw()hello from a test"))
    }));

    let pid = libc::pid_t::try_from(server.id()).unwrap();
    // SAFETY: sending a signal to a child process we spawned.
    unsafe { libc::kill(pid, libc::SIGTERM) };
    let status = server.wait().unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!paths.channel.exists());
    assert!(!paths.pid_file.exists());
}
