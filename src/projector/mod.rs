// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projectors: store subscriptions turned into local observable state.
//!
//! A [`Projector`] owns one store [`Subscription`](crate::store::Subscription)
//! and one background task. For every notification it decodes the snapshot,
//! replaces its value wholesale and publishes it through a `tokio::sync::watch`
//! channel. Readers never mutate the projected value.
//!
//! Store failures never reach data observers: the last known value is kept,
//! the failure is logged and the separate [`ProjectorStatus`] channel moves
//! to [`ProjectorStatus::Failed`].
//!
//! # Examples
//!
//! ```
//! use relaysync_lib::projector::{ProjectorStatus, RelayProjector};
//! use relaysync_lib::store::{MemoryStore, StorePath};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> relaysync_lib::Result<()> {
//! let store = MemoryStore::with_data(json!({"relay": {"relay1": true}}));
//! let projector = RelayProjector::relays(&store, &StorePath::new("relay")?, ())?;
//!
//! let mut relays = projector.watch();
//! relays.wait_for(|r| !r.is_empty()).await.unwrap();
//! assert_eq!(relays.borrow().get("relay1"), Some(true));
//! assert_eq!(projector.status(), ProjectorStatus::Live);
//!
//! projector.stop();
//! # Ok(())
//! # }
//! ```

mod relay;
mod schedule;

pub use relay::{RelayProjector, decode_relays};
pub use schedule::{ScheduleProjector, decode_schedule};

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::store::{RemoteStore, Snapshot, StoreEvent, StorePath, Subscription};

/// Which store path a projector mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectorKind {
    /// The relay states.
    Relays,
    /// The schedule configuration.
    Schedule,
}

impl fmt::Display for ProjectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relays => f.write_str("relays"),
            Self::Schedule => f.write_str("schedule"),
        }
    }
}

/// Health of a projector's subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectorStatus {
    /// Started, no data received yet.
    #[default]
    Pending,
    /// At least one snapshot applied, no failure since.
    Live,
    /// The store reported a failure; data is stale.
    Failed(String),
    /// Stopped by the owner.
    Stopped,
}

impl ProjectorStatus {
    /// Returns `true` for [`ProjectorStatus::Live`].
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Returns `true` for [`ProjectorStatus::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Receives projector updates on the projector task.
///
/// Both methods run after the matching watch channel was updated. They
/// must not block: [`Projector::stop`] waits for a call in progress. Calling
/// `stop` from inside an observer is allowed and does not wait.
/// `()` is a no-op observer.
pub trait ProjectionObserver<T>: Send + Sync {
    /// Called when the projected value changed.
    fn value_changed(&self, kind: ProjectorKind, value: &T) {
        let _ = (kind, value);
    }

    /// Called when the projector status changed.
    fn status_changed(&self, kind: ProjectorKind, status: &ProjectorStatus) {
        let _ = (kind, status);
    }
}

impl<T> ProjectionObserver<T> for () {}

impl<T, O: ProjectionObserver<T> + ?Sized> ProjectionObserver<T> for Arc<O> {
    fn value_changed(&self, kind: ProjectorKind, value: &T) {
        (**self).value_changed(kind, value);
    }

    fn status_changed(&self, kind: ProjectorKind, status: &ProjectorStatus) {
        (**self).status_changed(kind, status);
    }
}

/// Decodes a snapshot into the projected value.
pub type Decoder<T> = fn(&Snapshot) -> T;

thread_local! {
    /// Set while an observer runs on this thread.
    static IN_OBSERVER: Cell<bool> = const { Cell::new(false) };
}

fn observing(notify: impl FnOnce()) {
    let outer = IN_OBSERVER.with(|flag| flag.replace(true));
    notify();
    IN_OBSERVER.with(|flag| flag.set(outer));
}

/// State shared between a projector handle and its task.
struct Shared<T> {
    kind: ProjectorKind,
    value_tx: watch::Sender<T>,
    status_tx: watch::Sender<ProjectorStatus>,
    stopped: AtomicBool,
    /// Read-held while publishing and notifying; `halt` write-locks it to
    /// wait for a notification in progress.
    gate: RwLock<()>,
}

impl<T> Shared<T> {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Marks the projector stopped. Returns `false` if it already was.
    fn halt(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        // From inside an observer the read guard is ours; waiting would
        // deadlock.
        if !IN_OBSERVER.with(Cell::get) {
            drop(self.gate.write());
        }
        self.status_tx.send_replace(ProjectorStatus::Stopped);
        true
    }
}

impl<T: Clone + PartialEq> Shared<T> {
    /// Replaces the value and notifies `observer` if it changed.
    /// Returns `false` once stopped.
    fn publish<O: ProjectionObserver<T>>(&self, value: T, observer: &O) -> bool {
        let _gate = self.gate.read();
        if self.is_stopped() {
            return false;
        }
        let notify = value.clone();
        let changed = self.value_tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            tracing::trace!(kind = %self.kind, "projected value changed");
            observing(|| observer.value_changed(self.kind, &notify));
        }
        true
    }

    /// Sets the status and notifies `observer` if it changed.
    fn set_status<O: ProjectionObserver<T>>(&self, status: ProjectorStatus, observer: &O) {
        let _gate = self.gate.read();
        if self.is_stopped() {
            return;
        }
        let notify = status.clone();
        let changed = self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            observing(|| observer.status_changed(self.kind, &notify));
        }
    }
}

/// A running projection of one store path.
///
/// The projected value starts as `T::default()` with status
/// [`ProjectorStatus::Pending`]. Dropping the projector stops it.
pub struct Projector<T> {
    path: StorePath,
    shared: Arc<Shared<T>>,
    value_rx: watch::Receiver<T>,
    status_rx: watch::Receiver<ProjectorStatus>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Projector<T>
where
    T: Clone + Default + PartialEq + Send + Sync + 'static,
{
    /// Subscribes to `path` and starts projecting it on the current tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoRuntime` outside a tokio runtime, or the
    /// store's error if the subscription cannot be opened.
    pub fn start<S, O>(
        store: &S,
        path: &StorePath,
        kind: ProjectorKind,
        decode: Decoder<T>,
        observer: O,
    ) -> Result<Self, StoreError>
    where
        S: RemoteStore + ?Sized,
        O: ProjectionObserver<T> + 'static,
    {
        let handle = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let subscription = store.subscribe(path)?;

        let (value_tx, value_rx) = watch::channel(T::default());
        let (status_tx, status_rx) = watch::channel(ProjectorStatus::Pending);
        let shared = Arc::new(Shared {
            kind,
            value_tx,
            status_tx,
            stopped: AtomicBool::new(false),
            gate: RwLock::new(()),
        });

        tracing::debug!(%kind, path = %path, "starting projector");
        let task = handle.spawn(run(subscription, Arc::clone(&shared), decode, observer));

        Ok(Self {
            path: path.clone(),
            shared,
            value_rx,
            status_rx,
            task: Mutex::new(Some(task)),
        })
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.value_rx.borrow().clone()
    }

    /// Returns a receiver that observes every published value.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<T> {
        self.value_rx.clone()
    }
}

impl<T> Projector<T> {
    /// Returns which path this projector mirrors.
    #[must_use]
    pub fn kind(&self) -> ProjectorKind {
        self.shared.kind
    }

    /// Returns the projected store path.
    #[must_use]
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ProjectorStatus {
        self.status_rx.borrow().clone()
    }

    /// Returns a receiver that observes status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ProjectorStatus> {
        self.status_rx.clone()
    }

    /// Returns `true` once [`stop`](Self::stop) was called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Stops the projector.
    ///
    /// Once this returns, neither the value nor the status channel changes
    /// again (apart from the final [`ProjectorStatus::Stopped`]), no observer
    /// call is running or will start, and the store subscription is released.
    /// Called from inside an observer, it returns without waiting for that
    /// observer. Calling it twice is harmless.
    pub fn stop(&self) {
        if !self.shared.halt() {
            return;
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        tracing::debug!(kind = %self.shared.kind, path = %self.path, "projector stopped");
    }
}

impl<T> Drop for Projector<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            self.shared.halt();
            task.abort();
        }
    }
}

impl<T> fmt::Debug for Projector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projector")
            .field("kind", &self.shared.kind)
            .field("path", &self.path)
            .field("status", &*self.status_rx.borrow())
            .finish_non_exhaustive()
    }
}

async fn run<T, O>(
    mut subscription: Subscription,
    shared: Arc<Shared<T>>,
    decode: Decoder<T>,
    observer: O,
) where
    T: Clone + PartialEq,
    O: ProjectionObserver<T>,
{
    let kind = shared.kind;

    while let Some(event) = subscription.next().await {
        match event {
            StoreEvent::Changed(snapshot) => {
                if !shared.publish(decode(&snapshot), &observer) {
                    return;
                }
                shared.set_status(ProjectorStatus::Live, &observer);
            }
            StoreEvent::Failed(error) => {
                tracing::warn!(%kind, path = %subscription.path(), error = %error, "subscription failed, keeping last value");
                shared.set_status(ProjectorStatus::Failed(error.to_string()), &observer);
            }
        }
        if shared.is_stopped() {
            return;
        }
    }

    if !shared.is_stopped() && !shared.status_tx.borrow().is_failed() {
        tracing::warn!(%kind, path = %subscription.path(), "subscription ended");
        shared.set_status(
            ProjectorStatus::Failed(StoreError::StreamClosed.to_string()),
            &observer,
        );
    }
}
