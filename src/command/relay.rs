// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay switching commands.

use serde_json::Value;

use super::{Command, StoreLayout};
use crate::store::StorePath;
use crate::types::DeviceKey;

/// Command to switch one relay.
///
/// # Examples
///
/// ```
/// use relaysync_lib::command::{Command, RelayCommand, StoreLayout};
/// use relaysync_lib::types::DeviceKey;
/// use serde_json::json;
///
/// let key = DeviceKey::new("relay4").unwrap();
/// let cmd = RelayCommand::off(key);
/// assert_eq!(cmd.path(&StoreLayout::default()).to_string(), "relay/relay4");
/// assert_eq!(cmd.value(), json!(false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCommand {
    /// Overwrite the relay's state.
    Set {
        /// The relay to switch.
        key: DeviceKey,
        /// `true` for on.
        on: bool,
    },
}

impl RelayCommand {
    /// Creates a command to turn a relay on.
    #[must_use]
    pub fn on(key: DeviceKey) -> Self {
        Self::Set { key, on: true }
    }

    /// Creates a command to turn a relay off.
    #[must_use]
    pub fn off(key: DeviceKey) -> Self {
        Self::Set { key, on: false }
    }

    /// Creates a command setting a relay to `on`.
    #[must_use]
    pub fn set(key: DeviceKey, on: bool) -> Self {
        Self::Set { key, on }
    }
}

impl Command for RelayCommand {
    fn path(&self, layout: &StoreLayout) -> StorePath {
        match self {
            Self::Set { key, .. } => layout.relay().device(key),
        }
    }

    fn value(&self) -> Value {
        match self {
            Self::Set { on, .. } => Value::Bool(*on),
        }
    }
}
