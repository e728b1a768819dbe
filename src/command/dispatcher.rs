// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns user intents into store writes.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Command, RelayCommand, ScheduleCommand, StoreLayout};
use crate::error::Result;
use crate::state::RelaySnapshot;
use crate::store::RemoteStore;
use crate::types::{DeviceKey, ScheduleTime};

/// Issues fire-and-forget writes for relay and schedule changes.
///
/// A successful return means the write was handed to the store, not that
/// it was applied. The new value becomes visible locally only once the
/// store notifies the projectors.
///
/// The dispatcher never reads local state to decide a value. The one
/// exception is [`set_all_relays`](Self::set_all_relays), which reads the
/// set of relay keys currently projected.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use relaysync_lib::command::{CommandDispatcher, StoreLayout};
/// use relaysync_lib::state::RelaySnapshot;
/// use relaysync_lib::store::MemoryStore;
/// use relaysync_lib::types::{DeviceKey, ScheduleTime};
/// use serde_json::json;
/// use tokio::sync::watch;
///
/// # fn main() -> relaysync_lib::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let (_tx, relays) = watch::channel(RelaySnapshot::new());
/// let dispatcher = CommandDispatcher::new(Arc::clone(&store), StoreLayout::default(), relays);
///
/// dispatcher.set_relay(&DeviceKey::new("relay1")?, true)?;
/// dispatcher.set_on_time(ScheduleTime::new(19, 30)?)?;
///
/// let writes = store.writes();
/// assert_eq!(writes[0].path.to_string(), "relay/relay1");
/// assert_eq!(writes[1].value, json!("7:30 PM"));
/// # Ok(())
/// # }
/// ```
pub struct CommandDispatcher<S: ?Sized> {
    store: Arc<S>,
    layout: StoreLayout,
    relays: watch::Receiver<RelaySnapshot>,
}

impl<S: RemoteStore + ?Sized> CommandDispatcher<S> {
    /// Creates a dispatcher writing to `store`.
    ///
    /// `relays` supplies the key set used by
    /// [`set_all_relays`](Self::set_all_relays).
    #[must_use]
    pub fn new(store: Arc<S>, layout: StoreLayout, relays: watch::Receiver<RelaySnapshot>) -> Self {
        Self {
            store,
            layout,
            relays,
        }
    }

    /// Returns the layout commands are resolved against.
    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Validates and issues a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is invalid or the store cannot issue
    /// the write.
    pub fn send<C: Command>(&self, command: &C) -> Result<()> {
        command.validate()?;
        let path = command.path(&self.layout);
        let value = command.value();
        tracing::debug!(path = %path, value = %value, "Issuing write");
        self.store.write(&path, value)?;
        Ok(())
    }

    /// Switches one relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot issue the write.
    pub fn set_relay(&self, key: &DeviceKey, on: bool) -> Result<()> {
        self.send(&RelayCommand::set(key.clone(), on))
    }

    /// Switches every relay currently projected to `on`.
    ///
    /// Each relay gets its own independent write; there is no atomicity or
    /// ordering across them. Returns the number of writes issued, which is
    /// zero when no relay is known yet.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while issuing a write. Writes issued
    /// before it are not rolled back.
    pub fn set_all_relays(&self, on: bool) -> Result<usize> {
        let keys: Vec<DeviceKey> = self.relays.borrow().keys().cloned().collect();
        tracing::debug!(count = keys.len(), on, "Switching all relays");
        for key in &keys {
            self.set_relay(key, on)?;
        }
        Ok(keys.len())
    }

    /// Turns automatic scheduling on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot issue the write.
    pub fn set_schedule_enabled(&self, enabled: bool) -> Result<()> {
        self.send(&ScheduleCommand::SetEnabled(enabled))
    }

    /// Sets the schedule's switch-on time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot issue the write.
    pub fn set_on_time(&self, time: ScheduleTime) -> Result<()> {
        self.send(&ScheduleCommand::SetOnTime(time))
    }

    /// Sets the schedule's switch-off time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot issue the write.
    pub fn set_off_time(&self, time: ScheduleTime) -> Result<()> {
        self.send(&ScheduleCommand::SetOffTime(time))
    }

    /// Includes or excludes a relay from the schedule.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotSchedulable` if `key` does not start with
    /// `relay`, or an error if the store cannot issue the write.
    pub fn set_device_scheduled(&self, key: &DeviceKey, included: bool) -> Result<()> {
        self.send(&ScheduleCommand::include(key.clone(), included)?)
    }
}

impl<S: ?Sized> Clone for CommandDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            layout: self.layout.clone(),
            relays: self.relays.clone(),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for CommandDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{Error, StoreError, ValueError};
    use crate::store::{MemoryStore, Snapshot, StorePath, Subscription};

    fn key(k: &str) -> DeviceKey {
        DeviceKey::new(k).unwrap()
    }

    fn dispatcher_with(
        relays: RelaySnapshot,
    ) -> (Arc<MemoryStore>, CommandDispatcher<MemoryStore>, watch::Sender<RelaySnapshot>) {
        let store = Arc::new(MemoryStore::new());
        let (tx, rx) = watch::channel(relays);
        let dispatcher = CommandDispatcher::new(Arc::clone(&store), StoreLayout::default(), rx);
        (store, dispatcher, tx)
    }

    fn written(store: &MemoryStore) -> Vec<(String, serde_json::Value)> {
        store
            .writes()
            .into_iter()
            .map(|w| (w.path.to_string(), w.value))
            .collect()
    }

    #[test]
    fn set_relay_writes_one_field() {
        let (store, dispatcher, _tx) = dispatcher_with(RelaySnapshot::new());
        dispatcher.set_relay(&key("relay3"), true).unwrap();
        assert_eq!(written(&store), [("relay/relay3".to_string(), json!(true))]);
    }

    #[test]
    fn set_all_writes_every_known_key() {
        let relays = RelaySnapshot::decode(&Snapshot::new(
            Some("relay"),
            json!({"relay1": true, "relay2": false}),
        ));
        let (store, dispatcher, _tx) = dispatcher_with(relays);

        assert_eq!(dispatcher.set_all_relays(false).unwrap(), 2);
        assert_eq!(
            written(&store),
            [
                ("relay/relay1".to_string(), json!(false)),
                ("relay/relay2".to_string(), json!(false)),
            ]
        );
    }

    #[test]
    fn set_all_on_empty_snapshot_writes_nothing() {
        let (store, dispatcher, _tx) = dispatcher_with(RelaySnapshot::new());
        assert_eq!(dispatcher.set_all_relays(true).unwrap(), 0);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn set_all_uses_latest_snapshot() {
        let (store, dispatcher, tx) = dispatcher_with(RelaySnapshot::new());
        tx.send_replace(RelaySnapshot::decode(&Snapshot::new(
            Some("relay"),
            json!({"relay7": false}),
        )));
        assert_eq!(dispatcher.set_all_relays(true).unwrap(), 1);
        assert_eq!(written(&store), [("relay/relay7".to_string(), json!(true))]);
    }

    #[test]
    fn schedule_fields() {
        let (store, dispatcher, _tx) = dispatcher_with(RelaySnapshot::new());
        dispatcher.set_schedule_enabled(true).unwrap();
        dispatcher.set_on_time(ScheduleTime::new(0, 5).unwrap()).unwrap();
        dispatcher.set_off_time(ScheduleTime::new(23, 59).unwrap()).unwrap();
        dispatcher.set_device_scheduled(&key("relay2"), true).unwrap();

        assert_eq!(
            written(&store),
            [
                ("schedule/enabled".to_string(), json!(true)),
                ("schedule/onTime".to_string(), json!("12:05 AM")),
                ("schedule/offTime".to_string(), json!("11:59 PM")),
                ("schedule/relay2".to_string(), json!(true)),
            ]
        );
    }

    #[test]
    fn inclusion_of_reserved_key_is_rejected_before_writing() {
        let (store, dispatcher, _tx) = dispatcher_with(RelaySnapshot::new());
        let err = dispatcher
            .set_device_scheduled(&key("enabled"), false)
            .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::NotSchedulable(_))));
        assert!(store.writes().is_empty());
    }

    struct Offline;

    impl RemoteStore for Offline {
        fn subscribe(&self, _: &StorePath) -> std::result::Result<Subscription, StoreError> {
            Err(StoreError::NoRuntime)
        }

        fn write(&self, _: &StorePath, _: serde_json::Value) -> std::result::Result<(), StoreError> {
            Err(StoreError::NoRuntime)
        }
    }

    #[test]
    fn issue_failure_is_returned() {
        let (_tx, rx) = watch::channel(RelaySnapshot::new());
        let dispatcher = CommandDispatcher::new(Arc::new(Offline), StoreLayout::default(), rx);
        assert!(matches!(
            dispatcher.set_relay(&key("relay1"), true),
            Err(Error::Store(StoreError::NoRuntime))
        ));
    }

    #[test]
    fn works_through_trait_object() {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn RemoteStore> = store.clone();
        let (_tx, rx) = watch::channel(RelaySnapshot::new());
        let dispatcher = CommandDispatcher::new(dyn_store, StoreLayout::default(), rx);
        dispatcher.set_schedule_enabled(false).unwrap();
        assert_eq!(store.writes().len(), 1);
    }
}
