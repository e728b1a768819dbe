// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The running session tying projectors, dispatcher and callbacks together.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Session, SyncConfig};
use crate::catalog::RelayCatalog;
use crate::command::{CommandDispatcher, StoreLayout};
use crate::error::Result;
use crate::projector::{ProjectorKind, ProjectorStatus, RelayProjector, ScheduleProjector};
use crate::state::{RelaySnapshot, ScheduleConfig};
use crate::store::RemoteStore;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::DeviceKey;

/// A running synchronization between the store and local state.
///
/// Starting a session subscribes to the relay and schedule paths and
/// builds a [`CommandDispatcher`]. Both projected values start empty and
/// fill in as the store reports data.
///
/// The session does not check [`Session::is_signed_in`] before reading or
/// writing; access control belongs to the store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use relaysync_lib::session::{LocalIdentity, Session, SyncConfig, SyncSession};
/// use relaysync_lib::store::MemoryStore;
/// use relaysync_lib::types::DeviceKey;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> relaysync_lib::Result<()> {
/// let store = Arc::new(MemoryStore::with_data(json!({"relay": {"relay1": false}})));
/// let sync = SyncSession::start(
///     Arc::clone(&store),
///     Session::new(LocalIdentity::signed_in()),
///     SyncConfig::default(),
/// )?;
///
/// sync.dispatcher().set_relay(&DeviceKey::new("relay1")?, true)?;
///
/// let mut relays = sync.watch_relays();
/// relays.wait_for(|r| r.is_on("relay1")).await.unwrap();
///
/// sync.sign_out();
/// # Ok(())
/// # }
/// ```
pub struct SyncSession<S: ?Sized> {
    session: Session,
    config: SyncConfig,
    callbacks: Arc<CallbackRegistry>,
    relays: RelayProjector,
    schedule: ScheduleProjector,
    dispatcher: CommandDispatcher<S>,
}

impl<S: RemoteStore + ?Sized + 'static> SyncSession<S> {
    /// Starts projecting the store on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error outside a tokio runtime, or if the store refuses a
    /// subscription.
    pub fn start(store: Arc<S>, session: Session, config: SyncConfig) -> Result<Self> {
        let callbacks = Arc::new(CallbackRegistry::new());
        let layout = config.layout();

        let relays = RelayProjector::relays(&*store, layout.relay(), Arc::clone(&callbacks))?;
        let schedule =
            ScheduleProjector::schedule(&*store, layout.schedule(), Arc::clone(&callbacks))?;
        let dispatcher = CommandDispatcher::new(store, layout.clone(), relays.watch());

        tracing::info!(
            relay = %layout.relay(),
            schedule = %layout.schedule(),
            "Sync session started"
        );

        Ok(Self {
            session,
            config,
            callbacks,
            relays,
            schedule,
            dispatcher,
        })
    }
}

impl<S: ?Sized> SyncSession<S> {
    /// Returns the command dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher<S> {
        &self.dispatcher
    }

    /// Returns the identity session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the store layout in use.
    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        self.config.layout()
    }

    /// Returns the relay catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &RelayCatalog {
        self.config.catalog()
    }

    /// Returns a copy of the current relay states.
    #[must_use]
    pub fn relays(&self) -> RelaySnapshot {
        self.relays.current()
    }

    /// Returns a copy of the current schedule.
    #[must_use]
    pub fn schedule(&self) -> ScheduleConfig {
        self.schedule.current()
    }

    /// Returns a receiver observing the relay states.
    #[must_use]
    pub fn watch_relays(&self) -> watch::Receiver<RelaySnapshot> {
        self.relays.watch()
    }

    /// Returns a receiver observing the schedule.
    #[must_use]
    pub fn watch_schedule(&self) -> watch::Receiver<ScheduleConfig> {
        self.schedule.watch()
    }

    /// Returns the status of the relay projector.
    #[must_use]
    pub fn relay_status(&self) -> ProjectorStatus {
        self.relays.status()
    }

    /// Returns the status of the schedule projector.
    #[must_use]
    pub fn schedule_status(&self) -> ProjectorStatus {
        self.schedule.status()
    }

    /// Returns a receiver observing the relay projector status.
    #[must_use]
    pub fn watch_relay_status(&self) -> watch::Receiver<ProjectorStatus> {
        self.relays.watch_status()
    }

    /// Returns a receiver observing the schedule projector status.
    #[must_use]
    pub fn watch_schedule_status(&self) -> watch::Receiver<ProjectorStatus> {
        self.schedule.watch_status()
    }

    /// Returns the current relay keys in display order.
    #[must_use]
    pub fn relay_display_order(&self) -> Vec<DeviceKey> {
        self.config.catalog().display_order(&self.relays.current())
    }

    /// Returns every catalogued relay with its schedule inclusion flag.
    #[must_use]
    pub fn schedule_entries(&self) -> Vec<(DeviceKey, bool)> {
        self.config.catalog().schedule_entries(&self.schedule.current())
    }

    /// Returns `true` once the session was shut down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.relays.is_stopped() && self.schedule.is_stopped()
    }

    /// Stops both projectors.
    ///
    /// After this returns, no watch channel changes and no callback is
    /// started any more. The dispatcher keeps working, since writes do not
    /// depend on the projections.
    pub fn shutdown(&self) {
        if self.is_shut_down() {
            return;
        }
        self.relays.stop();
        self.schedule.stop();
        tracing::info!("Sync session shut down");
    }

    /// Shuts the session down, then signs out through the identity provider.
    pub fn sign_out(&self) {
        self.shutdown();
        self.session.sign_out();
    }
}

impl<S: ?Sized> Subscribable for SyncSession<S> {
    fn on_relays_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RelaySnapshot) + Send + Sync + 'static,
    {
        self.callbacks.on_relays_changed(callback)
    }

    fn on_schedule_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ScheduleConfig) + Send + Sync + 'static,
    {
        self.callbacks.on_schedule_changed(callback)
    }

    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ProjectorKind, &ProjectorStatus) + Send + Sync + 'static,
    {
        self.callbacks.on_status_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }

    fn clear_subscriptions(&self) {
        self.callbacks.clear();
    }
}

impl<S: ?Sized> std::fmt::Debug for SyncSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("session", &self.session)
            .field("layout", self.config.layout())
            .field("relays", &self.relays)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
