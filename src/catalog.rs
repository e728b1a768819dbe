// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human labels and display order for relays.
//!
//! The store only knows keys such as `relay3`. A [`RelayCatalog`] maps known
//! keys to labels and fixes the order they are listed in. Keys the catalog
//! does not know still show up, labelled with the key itself.

use std::cmp::Ordering;

use crate::state::{RelaySnapshot, ScheduleConfig};
use crate::types::DeviceKey;

/// An ordered list of known relays and their labels.
///
/// # Examples
///
/// ```
/// use relaysync_lib::catalog::RelayCatalog;
/// use relaysync_lib::state::RelaySnapshot;
/// use relaysync_lib::store::Snapshot;
/// use serde_json::json;
///
/// let catalog = RelayCatalog::household();
/// assert_eq!(catalog.label("relay1"), "Front Light");
/// assert_eq!(catalog.label("garage"), "garage");
///
/// let relays = RelaySnapshot::decode(&Snapshot::new(Some("relay"), json!({
///     "relay10": true, "relay2": false, "relay9": true, "relay1": true,
/// })));
/// let order: Vec<String> = catalog
///     .display_order(&relays)
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(order, ["relay1", "relay2", "relay9", "relay10"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayCatalog {
    entries: Vec<(DeviceKey, String)>,
}

impl RelayCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default deployment: eight relays wired to household lights.
    #[must_use]
    pub fn household() -> Self {
        [
            ("relay1", "Front Light"),
            ("relay2", "Living Room Light"),
            ("relay3", "Bedroom 1 Light"),
            ("relay4", "Bedroom 2 Light"),
            ("relay5", "Kitchen Light"),
            ("relay6", "Bathroom Light"),
            ("relay7", "Other"),
            ("relay8", "Other"),
        ]
        .into_iter()
        .map(|(key, label)| (DeviceKey::from_store(key), label.to_string()))
        .collect()
    }

    /// Appends a relay, or relabels it if already present.
    #[must_use]
    pub fn with_relay(mut self, key: DeviceKey, label: impl Into<String>) -> Self {
        let label = label.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((key, label)),
        }
        self
    }

    /// Returns the label of `key`, or the key itself if unknown.
    #[must_use]
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map_or(key, |(_, label)| label.as_str())
    }

    /// Returns `true` if the catalog knows `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Iterates over `(key, label)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceKey, &str)> {
        self.entries.iter().map(|(k, l)| (k, l.as_str()))
    }

    /// Returns the number of catalogued relays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Orders the keys of `relays` for display.
    ///
    /// Catalogued keys come first in catalog order, then the remaining keys
    /// in natural order (`relay2` before `relay10`). Only keys present in
    /// `relays` are returned.
    #[must_use]
    pub fn display_order(&self, relays: &RelaySnapshot) -> Vec<DeviceKey> {
        let mut keys: Vec<DeviceKey> = relays.keys().cloned().collect();
        keys.sort_by(|a, b| self.compare(a, b));
        keys
    }

    /// Lists every catalogued relay with its schedule inclusion flag.
    ///
    /// Relays with no flag in `schedule` are reported as excluded.
    #[must_use]
    pub fn schedule_entries(&self, schedule: &ScheduleConfig) -> Vec<(DeviceKey, bool)> {
        self.entries
            .iter()
            .map(|(key, _)| (key.clone(), schedule.is_scheduled(key.as_str())))
            .collect()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.as_str() == key)
    }

    fn compare(&self, a: &DeviceKey, b: &DeviceKey) -> Ordering {
        match (self.position(a.as_str()), self.position(b.as_str())) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.natural_cmp(b),
        }
    }
}

impl FromIterator<(DeviceKey, String)> for RelayCatalog {
    fn from_iter<I: IntoIterator<Item = (DeviceKey, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |catalog, (key, label)| catalog.with_relay(key, label))
    }
}
