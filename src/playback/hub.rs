//! Status fan-out to subscribers.
//!
//! The hub keeps the latest `PlaybackStatus` and one channel per
//! subscriber. New subscribers are primed with the current snapshot under
//! the same lock that publishes, so no subscriber ever sees an older
//! snapshot after a newer one.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::types::PlaybackStatus;

#[derive(Debug, Default)]
pub(super) struct Hub {
    inner: Mutex<HubInner>,
}

#[derive(Debug, Default)]
struct HubInner {
    status: PlaybackStatus,
    next_id: u64,
    listeners: Vec<(u64, Sender<PlaybackStatus>)>,
}

impl Hub {
    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn snapshot(&self) -> PlaybackStatus {
        self.lock().status.clone()
    }

    /// Apply `update` to the current status and broadcast the result.
    /// Nothing is sent when the update leaves the status unchanged.
    pub(super) fn publish(&self, update: impl FnOnce(&mut PlaybackStatus)) {
        let mut inner = self.lock();
        let before = inner.status.clone();
        update(&mut inner.status);
        if inner.status == before {
            return;
        }

        let HubInner {
            status, listeners, ..
        } = &mut *inner;
        // Receivers that were dropped without unsubscribing are pruned here.
        listeners.retain(|(_, tx)| tx.send(status.clone()).is_ok());
    }

    pub(super) fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        // Cannot fail: `rx` is alive right here.
        let _ = tx.send(inner.status.clone());
        inner.listeners.push((id, tx));

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.lock().listeners.retain(|(lid, _)| *lid != id);
    }

    #[cfg(test)]
    pub(super) fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

/// A stream of `PlaybackStatus` snapshots for one consumer.
///
/// The first snapshot (the status at subscription time) is available
/// immediately. Dropping the subscription unsubscribes; this stays safe
/// after the session has stopped or been dropped.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: Receiver<PlaybackStatus>,
    hub: Weak<Hub>,
}

impl Subscription {
    /// Next pending snapshot, if any.
    pub fn try_recv(&self) -> Option<PlaybackStatus> {
        match self.rx.try_recv() {
            Ok(status) => Some(status),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything pending and return only the newest snapshot.
    pub fn latest(&self) -> Option<PlaybackStatus> {
        let mut last = None;
        while let Some(status) = self.try_recv() {
            last = Some(status);
        }
        last
    }

    /// Wait up to `timeout` for the next snapshot.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<PlaybackStatus> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Stop receiving snapshots. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}
