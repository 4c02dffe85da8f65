//! Shared server context between the receiver and the render loop.
//!
//! A [`Relay`] owns the slot queue and the pending slot behind a single lock,
//! plus the condition variable the render loop sleeps on. The receiver only
//! ever stages into the pending slot; promotion into the queue is done by the
//! render loop, so the queue has a single writer.
//!
//! # Thread Safety
//!
//! Staging and signaling happen while the lock is held, so once the render
//! loop acquires the lock after a wake-up it always sees the staged message.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::constants::MAX_TTL_SECONDS;
use crate::queue::{Message, SlotState};

/// State guarded by the relay lock.
#[derive(Debug)]
pub(crate) struct RelayState {
    pub(crate) slots: SlotState,
    /// Set once no further messages will arrive.
    pub(crate) closed: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<RelayState>,
    arrival: Condvar,
    ttl: Duration,
}

/// Cloneable handle to one server instance's message state.
#[derive(Debug, Clone)]
pub struct Relay {
    shared: Arc<Shared>,
}

impl Relay {
    /// Creates a relay holding at most `slots` resident messages, each living `ttl`.
    ///
    /// `ttl` is capped at [`MAX_TTL_SECONDS`] so deadlines stay representable.
    #[must_use]
    pub fn new(slots: NonZeroUsize, ttl: Duration) -> Self {
        let ttl = ttl.min(Duration::from_secs(MAX_TTL_SECONDS));
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RelayState {
                    slots: SlotState::new(slots),
                    closed: false,
                }),
                arrival: Condvar::new(),
                ttl,
            }),
        }
    }

    /// Time-to-live applied to staged messages.
    #[must_use]
    pub fn ttl(&self) -> Duration { self.shared.ttl }

    /// Stages a newly arrived message and wakes the render loop.
    ///
    /// If an earlier arrival is still pending it is discarded. Returns `true`
    /// in that case.
    pub fn stage(&self, text: impl Into<String>) -> bool {
        let message = Message::new(text, self.shared.ttl);

        let mut state = self.shared.state.lock();
        tracing::debug!(bytes = message.text.len(), "staging message");
        let discarded = state.slots.stage(message);
        self.shared.arrival.notify_one();
        drop(state);

        if let Some(discarded) = &discarded {
            tracing::warn!(
                text = %discarded.text,
                "discarding message that arrived before the previous one was shown"
            );
        }

        discarded.is_some()
    }

    /// Marks the relay as closed and wakes the render loop so it can return.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        state.closed = true;
        self.shared.arrival.notify_all();
    }

    /// Returns whether [`Relay::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.shared.state.lock().closed }

    /// Texts of the resident messages, oldest first.
    #[must_use]
    pub fn resident(&self) -> Vec<String> {
        let state = self.shared.state.lock();
        state.slots.queue.iter().map(|message| message.text.clone()).collect()
    }

    /// Text of the pending message, if any.
    #[must_use]
    pub fn pending(&self) -> Option<String> {
        let state = self.shared.state.lock();
        state.slots.pending.as_ref().map(|message| message.text.clone())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RelayState> { self.shared.state.lock() }

    pub(crate) fn arrival(&self) -> &Condvar { &self.shared.arrival }
}
