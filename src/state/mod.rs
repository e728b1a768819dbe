// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local, decoded views of the store.
//!
//! [`RelaySnapshot`] mirrors the `relay` path and [`ScheduleConfig`] mirrors
//! the `schedule` path. Both are rebuilt from scratch on every store
//! notification: decoding never merges with a previous value, and never
//! fails (absent or mistyped fields fall back to `false` / `""`).

mod relay_state;
mod schedule_state;

pub use relay_state::RelaySnapshot;
pub use schedule_state::{ENABLED_KEY, OFF_TIME_KEY, ON_TIME_KEY, ScheduleConfig};
