use crate::playback::{PlaybackSession, PlaybackStatus, Subscription};

/// A screen's view of the playback session: its subscription plus the
/// newest snapshot it has seen. Dropping the feed unsubscribes.
#[derive(Debug)]
pub struct StatusFeed {
    subscription: Subscription,
    latest: PlaybackStatus,
}

impl StatusFeed {
    pub fn new(session: &PlaybackSession) -> Self {
        let subscription = session.subscribe();
        // The subscription is primed with the current status.
        let latest = subscription.latest().unwrap_or_else(|| session.status());
        Self {
            subscription,
            latest,
        }
    }

    /// Pull in any snapshots published since the last refresh. Returns
    /// whether anything changed.
    pub fn refresh(&mut self) -> bool {
        match self.subscription.latest() {
            Some(status) if status != self.latest => {
                self.latest = status;
                true
            }
            _ => false,
        }
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.latest
    }

    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}
