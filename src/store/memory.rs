// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process store.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use super::tree::{prune, set_at, value_at};
use super::{RemoteStore, Snapshot, StoreEvent, StorePath, Subscription};
use crate::error::StoreError;

/// A write received through [`RemoteStore::write`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    /// Target path.
    pub path: StorePath,
    /// Value written.
    pub value: Value,
}

/// A store that keeps its whole tree in memory.
///
/// It behaves like the remote service as far as subscribers can tell:
///
/// - a new subscription first receives the current value
/// - every write that changes data at or below a subscribed path notifies
///   that subscription with a fresh snapshot
/// - writes that leave the data unchanged notify nobody
///
/// Every call to [`RemoteStore::write`] is also kept in a log
/// ([`writes`](Self::writes)), which makes the store useful to check what a
/// component sent.
///
/// Clones share the same tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    subscribers: Vec<Subscriber>,
    writes: Vec<WriteRecord>,
}

struct Subscriber {
    path: StorePath,
    tx: mpsc::UnboundedSender<StoreEvent>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `root` as its whole tree.
    #[must_use]
    pub fn with_data(root: Value) -> Self {
        let store = Self::new();
        store.inner.lock().root = prune(root);
        store
    }

    /// Sets data without recording it in the write log.
    ///
    /// Subscribers are notified as for a normal write. This stands in for
    /// changes made by other clients of the store.
    pub fn seed(&self, path: &StorePath, value: Value) {
        let mut inner = self.inner.lock();
        inner.apply(path, value);
    }

    /// Returns the data currently stored at `path`.
    #[must_use]
    pub fn get(&self, path: &StorePath) -> Snapshot {
        let inner = self.inner.lock();
        let value = value_at(&inner.root, path).cloned().unwrap_or(Value::Null);
        Snapshot::at(path, value)
    }

    /// Returns every write received so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.inner.lock().writes.clone()
    }

    /// Returns and clears the write log.
    pub fn take_writes(&self) -> Vec<WriteRecord> {
        std::mem::take(&mut self.inner.lock().writes)
    }

    /// Reports a failure to every subscription overlapping `path`.
    pub fn fail(&self, path: &StorePath, reason: &str) {
        let mut inner = self.inner.lock();
        inner.prune_closed();
        for subscriber in inner.subscribers.iter().filter(|s| s.path.overlaps(path)) {
            let _ = subscriber
                .tx
                .send(StoreEvent::Failed(StoreError::Unavailable(reason.to_string())));
        }
    }

    /// Returns the number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.prune_closed();
        inner.subscribers.len()
    }
}

impl Inner {
    fn apply(&mut self, path: &StorePath, value: Value) {
        let before = value_at(&self.root, path).cloned().unwrap_or(Value::Null);
        let after = prune(value);
        if before == after {
            tracing::trace!(path = %path, "Write left data unchanged");
            return;
        }

        set_at(&mut self.root, path, after);
        self.prune_closed();

        let Inner {
            root, subscribers, ..
        } = self;
        for subscriber in subscribers.iter().filter(|s| s.path.overlaps(path)) {
            let value = value_at(root, &subscriber.path)
                .cloned()
                .unwrap_or(Value::Null);
            let _ = subscriber
                .tx
                .send(StoreEvent::Changed(Snapshot::at(&subscriber.path, value)));
        }
    }

    fn prune_closed(&mut self) {
        self.subscribers.retain(|s| !s.tx.is_closed());
    }
}

impl RemoteStore for MemoryStore {
    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        let (tx, subscription) = Subscription::channel(path.clone());
        let mut inner = self.inner.lock();

        let current = value_at(&inner.root, path).cloned().unwrap_or(Value::Null);
        let _ = tx.send(StoreEvent::Changed(Snapshot::at(path, current)));

        tracing::debug!(path = %path, "Memory store subscription opened");
        inner.subscribers.push(Subscriber {
            path: path.clone(),
            tx,
        });
        Ok(subscription)
    }

    fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        tracing::debug!(path = %path, value = %value, "Memory store write");
        let mut inner = self.inner.lock();
        inner.writes.push(WriteRecord {
            path: path.clone(),
            value: value.clone(),
        });
        inner.apply(path, value);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("subscribers", &inner.subscribers.len())
            .field("writes", &inner.writes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(p: &str) -> StorePath {
        StorePath::new(p).unwrap()
    }

    fn expect_changed(event: Option<StoreEvent>) -> Snapshot {
        match event {
            Some(StoreEvent::Changed(snapshot)) => snapshot,
            other => panic!("expected a change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribe_yields_current_value() {
        let store = MemoryStore::with_data(json!({"relay": {"relay1": true}}));
        let mut sub = store.subscribe(&path("relay")).unwrap();

        let snapshot = expect_changed(sub.next().await);
        assert_eq!(snapshot.key(), Some("relay"));
        assert_eq!(snapshot.value(), &json!({"relay1": true}));
    }

    #[tokio::test]
    async fn subscribe_to_missing_path_yields_empty() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(&path("schedule")).unwrap();
        assert!(!expect_changed(sub.next().await).exists());
    }

    #[tokio::test]
    async fn write_below_subscription_notifies() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(&path("relay")).unwrap();
        expect_changed(sub.next().await);

        store.write(&path("relay/relay2"), json!(false)).unwrap();
        let snapshot = expect_changed(sub.next().await);
        assert_eq!(snapshot.value(), &json!({"relay2": false}));
    }

    #[tokio::test]
    async fn unrelated_write_does_not_notify() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(&path("relay")).unwrap();
        expect_changed(sub.next().await);

        store.write(&path("schedule/enabled"), json!(true)).unwrap();
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn unchanged_write_does_not_notify_but_is_logged() {
        let store = MemoryStore::with_data(json!({"relay": {"relay1": true}}));
        let mut sub = store.subscribe(&path("relay")).unwrap();
        expect_changed(sub.next().await);

        store.write(&path("relay/relay1"), json!(true)).unwrap();
        assert!(sub.try_next().is_none());
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn seed_is_not_logged() {
        let store = MemoryStore::new();
        store.seed(&path("relay/relay1"), json!(true));
        assert!(store.writes().is_empty());
        assert_eq!(store.get(&path("relay/relay1")).as_bool(), Some(true));
    }

    #[test]
    fn take_writes_clears_log() {
        let store = MemoryStore::new();
        store.write(&path("relay/relay1"), json!(true)).unwrap();
        let taken = store.take_writes();
        assert_eq!(
            taken,
            [WriteRecord {
                path: path("relay/relay1"),
                value: json!(true)
            }]
        );
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn fail_reaches_overlapping_subscribers_only() {
        let store = MemoryStore::new();
        let mut relay = store.subscribe(&path("relay")).unwrap();
        let mut schedule = store.subscribe(&path("schedule")).unwrap();
        expect_changed(relay.next().await);
        expect_changed(schedule.next().await);

        store.fail(&path("relay"), "permission denied");
        assert!(matches!(
            relay.next().await,
            Some(StoreEvent::Failed(StoreError::Unavailable(_)))
        ));
        assert!(schedule.try_next().is_none());
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let store = MemoryStore::new();
        let sub = store.subscribe(&path("relay")).unwrap();
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }
}
