//! Render loop: the consumer side of the relay.
//!
//! Each wake cycle the loop:
//!
//! 1. Sleeps until the oldest message expires or a new arrival is signaled
//!    (indefinitely when the queue is empty). If the oldest message has
//!    expired by then, exactly that one is evicted.
//! 2. Promotes the pending message into the queue, if there is one.
//! 3. Composes the visible state and writes it to the display sink.
//!
//! Frames are composed under the relay lock and written after releasing it,
//! so a slow display never blocks the receiver.

use std::time::Instant;

use crate::display::{Directive, DisplaySink};
use crate::error::{Error, Result};
use crate::queue::SlotQueue;
use crate::relay::Relay;

/// Composes the directives describing the visible state of `queue`.
///
/// - An empty queue hides the display.
/// - Otherwise the most recent message becomes the foreground line. With more
///   than one message resident, unused slots are padded with blank lines so
///   the display keeps a stable height, followed by the remaining messages
///   oldest first.
/// - When `auto_collapse` is set, the display is collapsed for a single
///   message and expanded for several.
#[must_use]
pub fn compose_frame(queue: &SlotQueue, auto_collapse: bool) -> Vec<Directive> {
    let Some(primary) = queue.primary() else {
        return vec![Directive::Hide];
    };

    let mut frame = vec![
        Directive::Unhide,
        Directive::Clear,
        Directive::Foreground(primary.text.clone()),
    ];

    if queue.len() == 1 {
        if auto_collapse {
            frame.push(Directive::Collapse);
        }
        return frame;
    }

    if auto_collapse {
        frame.push(Directive::Uncollapse);
    }

    let unused = queue.capacity() - queue.len();
    frame.extend(std::iter::repeat_n(Directive::Blank, unused));
    frame.extend(queue.secondary().map(|message| Directive::Line(message.text.clone())));
    frame
}

/// Drives one relay's queue and renders it.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    relay: Relay,
    auto_collapse: bool,
}

impl RenderLoop {
    /// Creates a render loop over `relay`.
    #[must_use]
    pub const fn new(relay: Relay, auto_collapse: bool) -> Self { Self { relay, auto_collapse } }

    /// Runs one wake cycle and returns the frame to display.
    ///
    /// Blocks until the oldest resident message expires or the relay is
    /// signaled. An arrival made while the loop was not waiting is picked up
    /// without blocking. Returns `None` once the relay is closed.
    ///
    /// At most one message is evicted per cycle: the oldest, when its wait
    /// timed out or when it has already expired by the time an arrival wakes
    /// the loop.
    pub fn tick(&self) -> Option<Vec<Directive>> {
        let mut state = self.relay.lock();

        let mut timed_out = false;
        if !state.closed && state.slots.pending.is_none() {
            match state.slots.queue.nearest_deadline() {
                Some(deadline) => {
                    timed_out = self.relay.arrival().wait_until(&mut state, deadline).timed_out();
                }
                None => self.relay.arrival().wait(&mut state),
            }
        }

        if state.closed {
            return None;
        }

        let now = Instant::now();
        let expired =
            timed_out || state.slots.queue.nearest_deadline().is_some_and(|deadline| now >= deadline);
        if expired {
            if let Some(message) = state.slots.queue.evict_oldest() {
                tracing::debug!(text = %message.text, "message expired");
            }
        }

        if state.slots.push_pending_to_queue() {
            tracing::debug!(resident = state.slots.queue.len(), "promoted pending message");
        }

        Some(compose_frame(&state.slots.queue, self.auto_collapse))
    }

    /// Renders frames to `sink` until the relay is closed.
    ///
    /// # Errors
    ///
    /// Returns an error as soon as writing to the sink fails.
    pub fn run(&self, sink: &mut dyn DisplaySink) -> Result<()> {
        while let Some(frame) = self.tick() {
            sink.write_frame(&frame)
                .map_err(|err| Error::display(format!("failed to write frame: {err}")))?;
        }

        tracing::debug!("render loop stopped");
        Ok(())
    }
}
