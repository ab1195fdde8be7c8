use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::Snapshot;

pub(crate) const CHANNEL_CAPACITY: usize = 64;

/// Broadcast hub publishing full snapshots per date.
pub struct NotifyHub {
    channels: DashMap<NaiveDate, broadcast::Sender<Arc<Snapshot>>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to snapshots for a date. Creates the channel if needed.
    pub fn subscribe(&self, date: NaiveDate) -> broadcast::Receiver<Arc<Snapshot>> {
        let sender = self
            .channels
            .entry(date)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Whether anyone listens on `date`. A channel whose last receiver is gone
    /// is dropped here.
    pub fn has_subscribers(&self, date: &NaiveDate) -> bool {
        self.channels.remove_if(date, |_, s| s.receiver_count() == 0);
        self.channels.contains_key(date)
    }

    /// Number of open date channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send a snapshot. No-op if nobody is listening; idle channels are dropped.
    pub fn send(&self, snapshot: Arc<Snapshot>) {
        let date = snapshot.date;
        let delivered = match self.channels.get(&date) {
            Some(sender) => sender.send(snapshot).is_ok(),
            None => return,
        };
        if !delivered {
            self.channels.remove_if(&date, |_, s| s.receiver_count() == 0);
        }
    }
}
