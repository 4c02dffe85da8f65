//! Bounded message queue with per-message expiration.
//!
//! The queue keeps messages in insertion order (oldest first). When full,
//! the oldest message is evicted to make room, regardless of how much
//! time-to-live it has left. Expiration is driven from the outside: the render
//! loop asks for [`SlotQueue::nearest_deadline`] and calls
//! [`SlotQueue::evict_oldest`] when that deadline passes.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// A unit of queued content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Opaque, preformatted text passed through to the display.
    pub text: String,
    /// Moment after which the message is no longer resident.
    pub expires_at: Instant,
}

impl Message {
    /// Creates a message expiring `ttl` from now.
    #[must_use]
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self::expiring_at(text, Instant::now() + ttl)
    }

    /// Creates a message with an explicit expiration instant.
    #[must_use]
    pub fn expiring_at(text: impl Into<String>, expires_at: Instant) -> Self {
        Self { text: text.into(), expires_at }
    }

    /// Returns whether the message has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool { now >= self.expires_at }
}

/// Fixed-capacity, insertion-ordered message queue.
#[derive(Debug, Clone)]
pub struct SlotQueue {
    slots: VecDeque<Message>,
    capacity: NonZeroUsize,
}

impl SlotQueue {
    /// Creates an empty queue holding at most `capacity` messages.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { slots: VecDeque::new(), capacity }
    }

    /// Maximum number of resident messages.
    #[must_use]
    pub const fn capacity(&self) -> usize { self.capacity.get() }

    /// Number of resident messages.
    #[must_use]
    pub fn len(&self) -> usize { self.slots.len() }

    /// Returns whether no message is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Appends a message, evicting the oldest ones while the queue is full.
    ///
    /// Returns the evicted messages, oldest first.
    pub fn push(&mut self, message: Message) -> Vec<Message> {
        let mut evicted = Vec::new();
        while self.slots.len() >= self.capacity.get() {
            match self.evict_oldest() {
                Some(oldest) => evicted.push(oldest),
                None => break,
            }
        }

        self.slots.push_back(message);
        evicted
    }

    /// Removes the oldest message. No-op on an empty queue.
    pub fn evict_oldest(&mut self) -> Option<Message> { self.slots.pop_front() }

    /// Expiration of the oldest resident message, if any.
    ///
    /// Eviction is strictly FIFO, so this is the deadline the render loop waits
    /// for even when a younger message would expire sooner.
    #[must_use]
    pub fn nearest_deadline(&self) -> Option<Instant> {
        self.slots.front().map(|message| message.expires_at)
    }

    /// The most recently inserted message, rendered in the foreground.
    #[must_use]
    pub fn primary(&self) -> Option<&Message> { self.slots.back() }

    /// All resident messages except the primary one, oldest first.
    pub fn secondary(&self) -> impl Iterator<Item = &Message> {
        let count = self.slots.len().saturating_sub(1);
        self.slots.iter().take(count)
    }

    /// All resident messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> { self.slots.iter() }
}

/// The queue together with the single pending (not yet promoted) message.
///
/// Both live behind one lock in [`crate::relay::Relay`].
#[derive(Debug)]
pub struct SlotState {
    /// Resident messages.
    pub queue: SlotQueue,
    /// Message received but not yet promoted.
    pub pending: Option<Message>,
}

impl SlotState {
    /// Creates an empty state with the given capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { queue: SlotQueue::new(capacity), pending: None }
    }

    /// Puts `message` in the pending slot.
    ///
    /// Returns the message it replaced, if an earlier arrival had not been
    /// promoted yet. That message is dropped and never rendered.
    pub fn stage(&mut self, message: Message) -> Option<Message> { self.pending.replace(message) }

    /// Moves the pending message into the queue.
    ///
    /// Returns `false` if there was nothing pending.
    pub fn push_pending_to_queue(&mut self) -> bool {
        let Some(message) = self.pending.take() else {
            return false;
        };

        let evicted = self.queue.push(message);
        for message in &evicted {
            tracing::debug!(text = %message.text, "evicted oldest message to make room");
        }

        true
    }
}
