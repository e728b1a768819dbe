// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where relay and schedule data live in the store.

use crate::store::StorePath;

/// The two store locations the library reads and writes.
///
/// The default layout uses the root paths `relay` and `schedule`.
///
/// # Examples
///
/// ```
/// use relaysync_lib::command::StoreLayout;
/// use relaysync_lib::store::StorePath;
///
/// let layout = StoreLayout::under(&StorePath::new("homes/cabin").unwrap());
/// assert_eq!(layout.relay().to_string(), "homes/cabin/relay");
/// assert_eq!(layout.schedule().to_string(), "homes/cabin/schedule");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    relay: StorePath,
    schedule: StorePath,
}

impl StoreLayout {
    /// Default relay path segment.
    pub const RELAY: &'static str = "relay";
    /// Default schedule path segment.
    pub const SCHEDULE: &'static str = "schedule";

    /// Creates a layout from explicit paths.
    #[must_use]
    pub fn new(relay: StorePath, schedule: StorePath) -> Self {
        Self { relay, schedule }
    }

    /// Creates the default layout nested below `root`.
    #[must_use]
    pub fn under(root: &StorePath) -> Self {
        Self {
            relay: root.join_unchecked(Self::RELAY),
            schedule: root.join_unchecked(Self::SCHEDULE),
        }
    }

    /// Returns the path holding the relay states.
    #[must_use]
    pub fn relay(&self) -> &StorePath {
        &self.relay
    }

    /// Returns the path holding the schedule configuration.
    #[must_use]
    pub fn schedule(&self) -> &StorePath {
        &self.schedule
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::under(&StorePath::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_root_paths() {
        let layout = StoreLayout::default();
        assert_eq!(layout.relay().to_string(), "relay");
        assert_eq!(layout.schedule().to_string(), "schedule");
    }

    #[test]
    fn explicit_paths() {
        let layout = StoreLayout::new(
            StorePath::new("a/relays").unwrap(),
            StorePath::new("b/plan").unwrap(),
        );
        assert_eq!(layout.relay().segments(), ["a", "relays"]);
        assert_eq!(layout.schedule().last(), Some("plan"));
    }
}
