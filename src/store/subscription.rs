// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancelable stream of change notifications for one store path.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{StoreEvent, StorePath};

/// A live subscription to one store path.
///
/// Events arrive in the order the store emitted them. Dropping the
/// subscription (or calling [`cancel`](Self::cancel)) stops delivery and
/// aborts any background task feeding it.
pub struct Subscription {
    path: StorePath,
    events: mpsc::UnboundedReceiver<StoreEvent>,
    producer: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Creates a subscription and the sender a store uses to feed it.
    #[must_use]
    pub fn channel(path: StorePath) -> (mpsc::UnboundedSender<StoreEvent>, Self) {
        let (tx, events) = mpsc::unbounded_channel();
        let subscription = Self {
            path,
            events,
            producer: None,
        };
        (tx, subscription)
    }

    /// Ties a background task to this subscription; it is aborted on drop.
    #[must_use]
    pub fn with_producer(mut self, task: JoinHandle<()>) -> Self {
        self.producer = Some(task);
        self
    }

    /// Returns the subscribed path.
    #[must_use]
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the store stops producing events for this path.
    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.events.recv().await
    }

    /// Returns an already queued event without waiting.
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        self.events.try_recv().ok()
    }

    /// Stops the subscription.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(task) = self.producer.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("has_producer", &self.producer.is_some())
            .finish_non_exhaustive()
    }
}
