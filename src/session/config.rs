// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration.

use crate::catalog::RelayCatalog;
use crate::command::StoreLayout;

/// Configuration of a [`SyncSession`](super::SyncSession).
///
/// # Examples
///
/// ```
/// use relaysync_lib::catalog::RelayCatalog;
/// use relaysync_lib::command::StoreLayout;
/// use relaysync_lib::session::SyncConfig;
/// use relaysync_lib::store::StorePath;
/// use relaysync_lib::types::DeviceKey;
///
/// let config = SyncConfig::default()
///     .with_layout(StoreLayout::under(&StorePath::new("homes/main").unwrap()))
///     .with_catalog(RelayCatalog::new().with_relay(DeviceKey::new("relay1").unwrap(), "Porch"));
///
/// assert_eq!(config.layout().relay().to_string(), "homes/main/relay");
/// assert_eq!(config.catalog().label("relay1"), "Porch");
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    layout: StoreLayout,
    catalog: RelayCatalog,
}

impl SyncConfig {
    /// Creates a configuration with the default layout and the household
    /// catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: StoreLayout::default(),
            catalog: RelayCatalog::household(),
        }
    }

    /// Sets the store layout.
    #[must_use]
    pub fn with_layout(mut self, layout: StoreLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the relay catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: RelayCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns the store layout.
    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Returns the relay catalog.
    #[must_use]
    pub fn catalog(&self) -> &RelayCatalog {
        &self.catalog
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
