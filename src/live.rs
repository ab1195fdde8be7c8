use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::model::Snapshot;
use crate::store::Subscription;

/// The current day's reservations as last delivered by the store.
///
/// Only the subscription feed writes here, and always a whole snapshot at a time.
/// Readers take [`LiveSchedule::current`] and pass it to the engine explicitly.
pub struct LiveSchedule {
    date: NaiveDate,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl LiveSchedule {
    pub fn new(date: NaiveDate) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::empty(date)));
        Self { date, tx }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Change notifications for renderers.
    pub fn watch(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Replace the held snapshot. Snapshots for another date, or older than the
    /// one held, are dropped and `false` is returned.
    pub fn apply(&self, snapshot: Arc<Snapshot>) -> bool {
        if snapshot.date != self.date {
            warn!(expected = %self.date, got = %snapshot.date, "snapshot for wrong date dropped");
            return false;
        }
        let incoming = snapshot.revision;
        let held = self.tx.borrow().revision;
        let applied = self.tx.send_if_modified(|current| {
            if snapshot.revision < current.revision {
                return false;
            }
            *current = snapshot;
            true
        });
        if applied {
            metrics::counter!(crate::observability::SNAPSHOTS_APPLIED_TOTAL).increment(1);
            debug!(date = %self.date, revision = incoming, "snapshot applied");
        } else {
            metrics::counter!(crate::observability::SNAPSHOTS_STALE_TOTAL).increment(1);
            warn!(date = %self.date, incoming, held, "stale snapshot dropped");
        }
        applied
    }

    /// Apply every snapshot the subscription delivers until it closes.
    pub async fn follow(&self, mut subscription: Subscription) {
        while let Some(snapshot) = subscription.next().await {
            self.apply(snapshot);
        }
        debug!(date = %self.date, "subscription closed");
    }
}
