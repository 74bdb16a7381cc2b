//! Latest-value hand-off for completed video frames.
//!
//! The emulation loop produces one frame per video refresh and must never
//! wait on whoever displays them. A [`Publisher`] overwrites a single slot;
//! each [`Subscriber`] observes frames in emission order but skips any it
//! was too slow to collect.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Slot<T> {
    latest: Option<T>,
    /// Number of values published so far.
    sequence: u64,
    closed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // A panicking consumer cannot leave the slot half-written: every
        // mutation is a single assignment.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a connected publisher/subscriber pair.
#[must_use]
pub fn latest_channel<T: Clone>() -> (Publisher<T>, Subscriber<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            latest: None,
            sequence: 0,
            closed: false,
        }),
        ready: Condvar::new(),
    });
    (
        Publisher {
            shared: Arc::clone(&shared),
        },
        Subscriber { shared, seen: 0 },
    )
}

/// Producing end. Dropping it closes the channel.
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> Publisher<T> {
    /// Replace the current value and wake waiting subscribers.
    ///
    /// Returns the sequence number assigned to `value` (first is 1).
    pub fn publish(&self, value: T) -> u64 {
        let sequence = {
            let mut slot = self.shared.lock();
            slot.latest = Some(value);
            slot.sequence += 1;
            slot.sequence
        };
        self.shared.ready.notify_all();
        sequence
    }

    /// A new subscriber that has not yet seen any value.
    #[must_use]
    pub fn subscribe(&self) -> Subscriber<T> {
        Subscriber {
            shared: Arc::clone(&self.shared),
            seen: 0,
        }
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.ready.notify_all();
    }
}

/// Consuming end. Cloning yields an independent cursor over the same slot.
#[derive(Clone)]
pub struct Subscriber<T> {
    shared: Arc<Shared<T>>,
    seen: u64,
}

impl<T: Clone> Subscriber<T> {
    /// The newest value, if one was published since the last value this
    /// subscriber returned. Never blocks.
    pub fn try_latest(&mut self) -> Option<(u64, T)> {
        let slot = self.shared.lock();
        take_newer(&mut self.seen, &slot)
    }

    /// Block until a newer value arrives, the publisher is dropped, or
    /// `timeout` elapses.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<(u64, T)> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.lock();
        loop {
            if let Some(newer) = take_newer(&mut self.seen, &slot) {
                return Some(newer);
            }
            if slot.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            slot = self
                .shared
                .ready
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// True once the publisher has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// The slot's value if it is newer than `seen`, advancing `seen` past it.
fn take_newer<T: Clone>(seen: &mut u64, slot: &Slot<T>) -> Option<(u64, T)> {
    if slot.sequence <= *seen {
        return None;
    }
    let value = slot.latest.clone()?;
    *seen = slot.sequence;
    Some((slot.sequence, value))
}
