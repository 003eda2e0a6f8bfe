//! Ordered, case-insensitively deduplicated set of tracked cities.
//!
//! The duplicate check, the append and the fan-out to subscribers all happen
//! under one lock, so every subscriber receives one snapshot per insert, in
//! insert order.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::model::{CityKey, WeatherRecord};

/// Result of [`WeatherStore::upsert`]. `Skipped` is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Skipped,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<WeatherRecord>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<WeatherRecord>>>,
}

#[derive(Debug, Default)]
pub struct WeatherStore {
    inner: Mutex<Inner>,
}

impl WeatherStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless a record with the same normalized city is
    /// already present. Existing records are never replaced or moved.
    pub fn upsert(&self, record: WeatherRecord) -> UpsertOutcome {
        let key = record.key();
        let mut inner = self.inner.lock();

        if inner.records.iter().any(|existing| existing.key() == key) {
            debug!(city = %key, "City already tracked, keeping existing record");
            return UpsertOutcome::Skipped;
        }

        inner.records.push(record);
        let snapshot = inner.records.clone();
        inner.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());

        info!(city = %key, subscribers = inner.subscribers.len(), "Tracking new city");
        UpsertOutcome::Inserted
    }

    /// Snapshot in insertion order.
    pub fn all(&self) -> Vec<WeatherRecord> {
        self.inner.lock().records.clone()
    }

    pub fn contains(&self, city: &str) -> bool {
        let key = CityKey::new(city.trim());
        self.inner.lock().records.iter().any(|record| record.key() == key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Observe inserts. The handle starts out holding the current list.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        inner.subscribers.push(tx);
        Subscription { rx, current: inner.records.clone() }
    }
}

/// Handle returned by [`WeatherStore::subscribe`]; dropping it unsubscribes.
///
/// Snapshots only ever grow: earlier entries keep their positions.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<WeatherRecord>>,
    current: Vec<WeatherRecord>,
}

impl Subscription {
    /// Wait for the next insert and return the full list as of that insert.
    ///
    /// Every insert is delivered exactly once, in order. Returns `None` once
    /// the store has been dropped and all pending snapshots were taken.
    pub async fn changed(&mut self) -> Option<Vec<WeatherRecord>> {
        let snapshot = self.rx.recv().await?;
        self.current.clone_from(&snapshot);
        Some(snapshot)
    }

    /// Latest snapshot taken by `changed`, or the list at subscribe time.
    pub fn current(&self) -> Vec<WeatherRecord> {
        self.current.clone()
    }

    /// Whether an insert happened that `changed` has not delivered yet.
    pub fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}
