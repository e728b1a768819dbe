// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types exposing projected state.

use crate::projector::{ProjectorKind, ProjectorStatus};
use crate::state::{RelaySnapshot, ScheduleConfig};
use crate::subscription::SubscriptionId;

/// Trait for types that notify callbacks about projected state changes.
///
/// Callbacks only fire when a value actually changed. They run on the
/// projector task and should return quickly.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use relaysync_lib::session::{LocalIdentity, Session, SyncConfig, SyncSession};
/// use relaysync_lib::store::MemoryStore;
/// use relaysync_lib::subscription::Subscribable;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> relaysync_lib::Result<()> {
/// let session = Session::new(LocalIdentity::signed_in());
/// let sync = SyncSession::start(Arc::new(MemoryStore::new()), session, SyncConfig::default())?;
///
/// let sub_id = sync.on_relays_changed(|relays| {
///     println!("{} of {} relays on", relays.active_count(), relays.len());
/// });
///
/// sync.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to relay snapshot changes.
    fn on_relays_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RelaySnapshot) + Send + Sync + 'static;

    /// Subscribes to schedule configuration changes.
    ///
    /// A store notification that changes several schedule fields triggers
    /// one call with all of them applied.
    fn on_schedule_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ScheduleConfig) + Send + Sync + 'static;

    /// Subscribes to projector status changes, such as a subscription
    /// failure.
    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ProjectorKind, &ProjectorStatus) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Removes all subscriptions.
    fn clear_subscriptions(&self);
}
