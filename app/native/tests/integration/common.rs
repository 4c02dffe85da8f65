//! Common test utilities.

#![allow(dead_code)]

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
pub use stackpop_lib::display::{Directive, LineDisplay};
pub use stackpop_lib::relay::Relay;
pub use stackpop_lib::render::RenderLoop;

/// In-memory writer whose contents stay readable after being handed away.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock()).lines().map(ToString::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Creates a relay with `slots` slots and the given time-to-live.
pub fn relay(slots: usize, ttl: Duration) -> Relay {
    Relay::new(NonZeroUsize::new(slots).unwrap(), ttl)
}

/// Renders a frame as protocol lines.
pub fn lines(frame: &[Directive]) -> Vec<String> {
    frame.iter().map(ToString::to_string).collect()
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
