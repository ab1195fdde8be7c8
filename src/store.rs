use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use futures::Stream;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;
use ulid::Ulid;

use crate::model::*;
use crate::notify::NotifyHub;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached or refused the call.
    Unavailable(String),
    NotFound(ReservationId),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
            StoreError::NotFound(id) => write!(f, "reservation not found: {id}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Document store holding reservations, with a live per-date feed.
///
/// The store is the only writer of durable state. Implementations are not
/// required to make check-then-write atomic.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Live feed for one date: the full current set right away, then the full
    /// set again after every change. Dropping the subscription stops delivery.
    async fn subscribe(&self, date: NaiveDate) -> Result<Subscription, StoreError>;

    /// Persist a new reservation and return its assigned id.
    async fn create(&self, fields: ReservationFields) -> Result<ReservationId, StoreError>;

    /// Replace every field of an existing reservation.
    async fn update(&self, id: ReservationId, fields: ReservationFields) -> Result<(), StoreError>;

    /// Remove a reservation. Removing an unknown id succeeds.
    async fn delete(&self, id: ReservationId) -> Result<(), StoreError>;
}

// ── Subscription ─────────────────────────────────────────

pub struct Subscription {
    date: NaiveDate,
    initial: Option<Arc<Snapshot>>,
    rx: broadcast::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    pub fn new(initial: Arc<Snapshot>, rx: broadcast::Receiver<Arc<Snapshot>>) -> Self {
        metrics::gauge!(crate::observability::SUBSCRIBERS_ACTIVE).increment(1.0);
        Self {
            date: initial.date,
            initial: Some(initial),
            rx,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Next full snapshot, or `None` once the store side has gone away.
    ///
    /// A lagging subscriber skips the snapshots it missed; each one is complete,
    /// so only the newest matters.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(date = %self.date, skipped, "subscriber lagged, skipping to newer snapshot");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Arc<Snapshot>> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            let snapshot = sub.next().await?;
            Some((snapshot, sub))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        metrics::gauge!(crate::observability::SUBSCRIBERS_ACTIVE).decrement(1.0);
    }
}

// ── In-memory store ──────────────────────────────────────

/// Process-local [`ReservationStore`]. Writes are serialized so every published
/// snapshot matches exactly one revision.
pub struct InMemoryStore {
    records: DashMap<ReservationId, Reservation>,
    revision: AtomicU64,
    write_lock: Mutex<()>,
    available: AtomicBool,
    notify: NotifyHub,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            revision: AtomicU64::new(0),
            write_lock: Mutex::new(()),
            available: AtomicBool::new(true),
            notify: NotifyHub::new(),
        }
    }

    /// When false, every call fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ReservationId) -> Option<Reservation> {
        self.records.get(id).map(|e| e.value().clone())
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Current full set for a date.
    pub fn snapshot(&self, date: NaiveDate) -> Snapshot {
        let reservations = self
            .records
            .iter()
            .filter(|e| e.value().fields.date == date)
            .map(|e| e.value().clone())
            .collect();
        Snapshot::new(date, self.revision(), reservations)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".into()))
        }
    }

    /// Bump the revision and push fresh snapshots for the touched dates.
    /// Caller holds the write lock.
    fn commit(&self, dates: &[NaiveDate]) {
        self.revision.fetch_add(1, Ordering::SeqCst);
        for (i, date) in dates.iter().enumerate() {
            if dates[..i].contains(date) || !self.notify.has_subscribers(date) {
                continue;
            }
            self.notify.send(Arc::new(self.snapshot(*date)));
        }
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn subscribe(&self, date: NaiveDate) -> Result<Subscription, StoreError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;
        let rx = self.notify.subscribe(date);
        Ok(Subscription::new(Arc::new(self.snapshot(date)), rx))
    }

    async fn create(&self, fields: ReservationFields) -> Result<ReservationId, StoreError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;
        let id = Ulid::new();
        let date = fields.date;
        self.records.insert(id, Reservation::new(id, fields));
        self.commit(&[date]);
        Ok(id)
    }

    async fn update(&self, id: ReservationId, fields: ReservationFields) -> Result<(), StoreError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;
        let new_date = fields.date;
        let old_date = {
            let mut entry = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            let old = entry.fields.date;
            entry.fields = fields;
            old
        };
        self.commit(&[new_date, old_date]);
        Ok(())
    }

    async fn delete(&self, id: ReservationId) -> Result<(), StoreError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;
        if let Some((_, removed)) = self.records.remove(&id) {
            self.commit(&[removed.fields.date]);
        }
        Ok(())
    }
}
