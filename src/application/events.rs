//! Client events surfaced to whatever drives the UI.
//!
//! Refresh and mutation paths publish here; the shell owner drains the queue
//! and decides how to present each event (banner, alert, log line).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::info;

use crate::cache::lock::mutex_lock;

const SOURCE: &str = "application::events";

/// Monotonic sequence number of an event within this process.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct ClientEvent {
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The backend was upgraded since the first snapshot; show the banner once.
    UpgradeAvailable { marker: String },
    /// A background refresh failed and stale data was kept.
    RefreshFailed { warning: String },
    /// A user-initiated call was rejected; present the message blocking.
    Alert { message: String },
}

pub struct EventQueue {
    queue: Mutex<VecDeque<ClientEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    /// Publish an event, stamping it with the next epoch.
    pub fn publish(&self, kind: EventKind) {
        let event = ClientEvent {
            epoch: self.epoch_counter.fetch_add(1, Ordering::SeqCst),
            kind,
            timestamp: OffsetDateTime::now_utc(),
        };

        info!(
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "Client event published"
        );

        mutex_lock(&self.queue, SOURCE, "publish").push_back(event);
    }

    /// Drain every pending event in FIFO order.
    pub fn drain(&self) -> Vec<ClientEvent> {
        mutex_lock(&self.queue, SOURCE, "drain").drain(..).collect()
    }

    /// Get the current queue length.
    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn publish_and_drain_in_order() {
        let queue = EventQueue::new();

        queue.publish(EventKind::RefreshFailed {
            warning: "offline".into(),
        });
        queue.publish(EventKind::Alert {
            message: "no user found".into(),
        });

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert!(events[0].epoch < events[1].epoch);
        assert!(matches!(events[0].kind, EventKind::RefreshFailed { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn event_queue_recovers_from_poisoned_lock() {
        let queue = EventQueue::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = queue.queue.lock().expect("queue lock should be acquired");
            panic!("poison queue lock");
        }));

        queue.publish(EventKind::Alert {
            message: "still works".into(),
        });
        assert_eq!(queue.len(), 1);
    }
}
