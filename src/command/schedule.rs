// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schedule configuration commands.

use serde_json::Value;

use super::{Command, StoreLayout};
use crate::error::ValueError;
use crate::state::{ENABLED_KEY, OFF_TIME_KEY, ON_TIME_KEY};
use crate::store::StorePath;
use crate::types::{DeviceKey, ScheduleTime};

/// Command to change one field of the schedule.
///
/// Device inclusion flags share the schedule path with `enabled`, `onTime`
/// and `offTime`. Only keys starting with `relay` are accepted for them, so
/// an inclusion flag can never overwrite one of those fields.
///
/// # Examples
///
/// ```
/// use relaysync_lib::command::{Command, ScheduleCommand, StoreLayout};
/// use relaysync_lib::types::DeviceKey;
/// use serde_json::json;
///
/// let layout = StoreLayout::default();
///
/// let cmd = ScheduleCommand::include(DeviceKey::new("relay5").unwrap(), true).unwrap();
/// assert_eq!(cmd.path(&layout).to_string(), "schedule/relay5");
/// assert_eq!(cmd.value(), json!(true));
///
/// assert!(ScheduleCommand::include(DeviceKey::new("enabled").unwrap(), true).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleCommand {
    /// Turn automatic scheduling on or off.
    SetEnabled(bool),
    /// Set the time relays switch on.
    SetOnTime(ScheduleTime),
    /// Set the time relays switch off.
    SetOffTime(ScheduleTime),
    /// Include or exclude a relay from the schedule.
    SetDeviceIncluded {
        /// The relay, which must start with `relay`.
        key: DeviceKey,
        /// `true` to include.
        included: bool,
    },
}

impl ScheduleCommand {
    /// Creates an inclusion command after checking the key.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotSchedulable` if `key` does not start with
    /// `relay`.
    pub fn include(key: DeviceKey, included: bool) -> Result<Self, ValueError> {
        let cmd = Self::SetDeviceIncluded { key, included };
        cmd.validate()?;
        Ok(cmd)
    }
}

impl Command for ScheduleCommand {
    fn path(&self, layout: &StoreLayout) -> StorePath {
        let schedule = layout.schedule();
        match self {
            Self::SetEnabled(_) => schedule.join_unchecked(ENABLED_KEY),
            Self::SetOnTime(_) => schedule.join_unchecked(ON_TIME_KEY),
            Self::SetOffTime(_) => schedule.join_unchecked(OFF_TIME_KEY),
            Self::SetDeviceIncluded { key, .. } => schedule.device(key),
        }
    }

    fn value(&self) -> Value {
        match self {
            Self::SetEnabled(enabled) => Value::Bool(*enabled),
            Self::SetOnTime(time) | Self::SetOffTime(time) => {
                Value::String(time.to_display_string())
            }
            Self::SetDeviceIncluded { included, .. } => Value::Bool(*included),
        }
    }

    fn validate(&self) -> Result<(), ValueError> {
        match self {
            Self::SetDeviceIncluded { key, .. } if !key.is_schedulable() => {
                Err(ValueError::NotSchedulable(key.to_string()))
            }
            _ => Ok(()),
        }
    }
}
