// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded state of every relay under the `relay` path.

use std::collections::BTreeMap;

use crate::store::Snapshot;
use crate::types::DeviceKey;

/// On/off state of every relay currently present in the store.
///
/// The snapshot holds exactly the keys found under the relay path. A relay
/// missing from the store is missing here too; it is never reported as
/// "off".
///
/// # Examples
///
/// ```
/// use relaysync_lib::state::RelaySnapshot;
/// use relaysync_lib::store::Snapshot;
/// use serde_json::json;
///
/// let store_data = Snapshot::new(Some("relay"), json!({
///     "relay1": true,
///     "relay2": false,
///     "relay3": "broken",
/// }));
///
/// let relays = RelaySnapshot::decode(&store_data);
/// assert_eq!(relays.len(), 3);
/// assert_eq!(relays.get("relay1"), Some(true));
/// assert_eq!(relays.get("relay3"), Some(false)); // mistyped value
/// assert_eq!(relays.get("relay4"), None);        // absent
/// assert_eq!(relays.active_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RelaySnapshot {
    states: BTreeMap<DeviceKey, bool>,
}

impl RelaySnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the data stored under the relay path.
    ///
    /// Every immediate child becomes one entry. Non-boolean values decode as
    /// `false`.
    #[must_use]
    pub fn decode(snapshot: &Snapshot) -> Self {
        snapshot
            .children()
            .into_iter()
            .filter_map(|child| {
                let key = DeviceKey::from_store(child.key()?);
                Some((key, child.bool_or_default()))
            })
            .collect()
    }

    /// Returns the state of `key`, or `None` if the store has no such relay.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.states.get(key).copied()
    }

    /// Returns `true` if `key` is present and on.
    #[must_use]
    pub fn is_on(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Returns `true` if the store has a relay named `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// Returns the number of relays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no relay is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the number of relays that are on.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.states.values().filter(|on| **on).count()
    }

    /// Iterates over the relay keys in key order.
    pub fn keys(&self) -> impl Iterator<Item = &DeviceKey> {
        self.states.keys()
    }

    /// Iterates over `(key, is_on)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceKey, bool)> {
        self.states.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(DeviceKey, bool)> for RelaySnapshot {
    fn from_iter<I: IntoIterator<Item = (DeviceKey, bool)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}
