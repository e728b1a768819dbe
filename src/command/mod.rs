// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store write commands.
//!
//! Every user intent becomes one unconditional overwrite of a single store
//! field. Commands never read local state to decide what to write.
//!
//! # Available Commands
//!
//! | Command | Target path | Value |
//! |---------|-------------|-------|
//! | [`RelayCommand::Set`] | `relay/<key>` | bool |
//! | [`ScheduleCommand::SetEnabled`] | `schedule/enabled` | bool |
//! | [`ScheduleCommand::SetOnTime`] | `schedule/onTime` | `"H:MM AM\|PM"` |
//! | [`ScheduleCommand::SetOffTime`] | `schedule/offTime` | `"H:MM AM\|PM"` |
//! | [`ScheduleCommand::SetDeviceIncluded`] | `schedule/<key>` | bool |
//!
//! "Set all relays" is not a command of its own: the [`CommandDispatcher`]
//! issues one [`RelayCommand::Set`] per relay currently known.
//!
//! # Examples
//!
//! ```
//! use relaysync_lib::command::{Command, RelayCommand, ScheduleCommand, StoreLayout};
//! use relaysync_lib::types::{DeviceKey, ScheduleTime};
//! use serde_json::json;
//!
//! let layout = StoreLayout::default();
//!
//! let cmd = RelayCommand::on(DeviceKey::new("relay2").unwrap());
//! assert_eq!(cmd.path(&layout).to_string(), "relay/relay2");
//! assert_eq!(cmd.value(), json!(true));
//!
//! let cmd = ScheduleCommand::SetOnTime(ScheduleTime::new(18, 0).unwrap());
//! assert_eq!(cmd.path(&layout).to_string(), "schedule/onTime");
//! assert_eq!(cmd.value(), json!("6:00 PM"));
//! ```

mod dispatcher;
mod layout;
mod relay;
mod schedule;

pub use dispatcher::CommandDispatcher;
pub use layout::StoreLayout;
pub use relay::RelayCommand;
pub use schedule::ScheduleCommand;

use serde_json::Value;

use crate::error::ValueError;
use crate::store::StorePath;

/// A single-field write to the store.
pub trait Command {
    /// Returns the store path this command overwrites.
    fn path(&self, layout: &StoreLayout) -> StorePath;

    /// Returns the value written.
    fn value(&self) -> Value;

    /// Checks that the command may be issued.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the command would write outside its field.
    fn validate(&self) -> Result<(), ValueError> {
        Ok(())
    }
}
