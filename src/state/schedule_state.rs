// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded schedule configuration under the `schedule` path.

use std::collections::BTreeMap;

use crate::store::Snapshot;
use crate::types::{DeviceKey, ScheduleTime};

/// Store key of the schedule's on/off switch.
pub const ENABLED_KEY: &str = "enabled";
/// Store key of the switch-on time.
pub const ON_TIME_KEY: &str = "onTime";
/// Store key of the switch-off time.
pub const OFF_TIME_KEY: &str = "offTime";

/// The automatic schedule, as stored.
///
/// Times are kept as the raw display strings found in the store (`""` when
/// unset); [`on_time`](Self::on_time) and [`off_time`](Self::off_time)
/// parse them on demand.
///
/// # Examples
///
/// ```
/// use relaysync_lib::state::ScheduleConfig;
/// use relaysync_lib::store::Snapshot;
/// use serde_json::json;
///
/// let store_data = Snapshot::new(Some("schedule"), json!({
///     "enabled": true,
///     "onTime": "6:00 PM",
///     "offTime": "5:30 AM",
///     "relay1": true,
///     "relay3": false,
/// }));
///
/// let schedule = ScheduleConfig::decode(&store_data);
/// assert!(schedule.enabled);
/// assert_eq!(schedule.on_time_raw, "6:00 PM");
/// assert_eq!(schedule.off_time().unwrap().hour(), 5);
/// assert!(schedule.is_scheduled("relay1"));
/// assert!(!schedule.is_scheduled("relay3"));
/// assert_eq!(schedule.scheduled_devices.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Whether automatic scheduling is active.
    pub enabled: bool,
    /// Switch-on time as stored, `""` when unset.
    #[serde(rename = "onTime")]
    pub on_time_raw: String,
    /// Switch-off time as stored, `""` when unset.
    #[serde(rename = "offTime")]
    pub off_time_raw: String,
    /// Inclusion flag of every `relay*` child of the schedule path.
    pub scheduled_devices: BTreeMap<DeviceKey, bool>,
}

impl ScheduleConfig {
    /// Decodes the data stored under the schedule path.
    ///
    /// - `enabled` defaults to `false`
    /// - `onTime` and `offTime` default to `""`
    /// - `scheduled_devices` keeps only children whose key starts with
    ///   `relay`, decoded as booleans (mistyped values become `false`)
    #[must_use]
    pub fn decode(snapshot: &Snapshot) -> Self {
        let scheduled_devices = snapshot
            .children()
            .into_iter()
            .filter_map(|child| {
                let key = child.key()?;
                key.starts_with(DeviceKey::SCHEDULE_PREFIX)
                    .then(|| (DeviceKey::from_store(key), child.bool_or_default()))
            })
            .collect();

        Self {
            enabled: snapshot.child(ENABLED_KEY).bool_or_default(),
            on_time_raw: snapshot.child(ON_TIME_KEY).string_or_default(),
            off_time_raw: snapshot.child(OFF_TIME_KEY).string_or_default(),
            scheduled_devices,
        }
    }

    /// Returns the parsed switch-on time, or `None` if unset or malformed.
    #[must_use]
    pub fn on_time(&self) -> Option<ScheduleTime> {
        self.on_time_raw.parse().ok()
    }

    /// Returns the parsed switch-off time, or `None` if unset or malformed.
    #[must_use]
    pub fn off_time(&self) -> Option<ScheduleTime> {
        self.off_time_raw.parse().ok()
    }

    /// Returns `true` if `key` has an inclusion flag set to `true`.
    #[must_use]
    pub fn is_scheduled(&self, key: &str) -> bool {
        self.scheduled_devices.get(key).copied().unwrap_or(false)
    }

    /// Iterates over the devices whose inclusion flag is `true`.
    pub fn included_devices(&self) -> impl Iterator<Item = &DeviceKey> {
        self.scheduled_devices
            .iter()
            .filter(|(_, included)| **included)
            .map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn schedule_snapshot(value: Value) -> Snapshot {
        Snapshot::new(Some("schedule"), value)
    }

    #[test]
    fn device_flags_are_filtered_by_prefix() {
        let schedule = ScheduleConfig::decode(&schedule_snapshot(json!({
            "enabled": true,
            "onTime": "6:00 PM",
            "offTime": "6:00 AM",
            "relay1": true,
            "relay3": false,
            "other": true,
        })));

        let keys: Vec<&str> = schedule
            .scheduled_devices
            .keys()
            .map(DeviceKey::as_str)
            .collect();
        assert_eq!(keys, ["relay1", "relay3"]);
    }

    #[test]
    fn empty_snapshot_uses_defaults() {
        let schedule = ScheduleConfig::decode(&schedule_snapshot(Value::Null));
        assert_eq!(schedule, ScheduleConfig::default());
        assert!(!schedule.enabled);
        assert_eq!(schedule.on_time_raw, "");
        assert_eq!(schedule.off_time_raw, "");
        assert!(schedule.scheduled_devices.is_empty());
    }

    #[test]
    fn mistyped_fields_use_defaults() {
        let schedule = ScheduleConfig::decode(&schedule_snapshot(json!({
            "enabled": "yes",
            "onTime": 1800,
            "offTime": false,
            "relay2": "true",
        })));
        assert!(!schedule.enabled);
        assert_eq!(schedule.on_time_raw, "");
        assert_eq!(schedule.off_time_raw, "");
        assert_eq!(schedule.scheduled_devices.get("relay2"), Some(&false));
    }

    #[test]
    fn times_parse_on_demand() {
        let schedule = ScheduleConfig::decode(&schedule_snapshot(json!({
            "onTime": "12:05 AM",
            "offTime": "garbage",
        })));
        assert_eq!(schedule.on_time(), Some(ScheduleTime::new(0, 5).unwrap()));
        assert_eq!(schedule.off_time(), None);
    }

    #[test]
    fn included_devices_skip_false_flags() {
        let schedule = ScheduleConfig::decode(&schedule_snapshot(json!({
            "relay1": true,
            "relay2": false,
            "relay5": true,
        })));
        let included: Vec<&str> = schedule.included_devices().map(DeviceKey::as_str).collect();
        assert_eq!(included, ["relay1", "relay5"]);
        assert!(!schedule.is_scheduled("relay9"));
    }

    #[test]
    fn serializes_with_store_field_names() {
        let schedule = ScheduleConfig {
            enabled: true,
            on_time_raw: "7:00 PM".to_string(),
            off_time_raw: String::new(),
            scheduled_devices: BTreeMap::new(),
        };
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["onTime"], json!("7:00 PM"));
        assert_eq!(value["scheduledDevices"], json!({}));
    }
}
