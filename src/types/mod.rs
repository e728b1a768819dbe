// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the store, the projectors and the commands.
//!
//! Values built by callers are validated at construction time, so a command
//! can never write a malformed key or time to the store.
//!
//! # Types
//!
//! - [`DeviceKey`] - Name of one relay (`relay1`, `relay2`, ...)
//! - [`ScheduleTime`] - Time of day shown as `H:MM AM|PM`

mod device_key;
mod time;

pub use device_key::DeviceKey;
pub use time::{ScheduleTime, format_to_12_hour};
