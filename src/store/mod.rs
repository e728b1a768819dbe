// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote store boundary.
//!
//! The store is a hierarchical key/value service that acts as the system of
//! record for relay state and the schedule. This module defines the small
//! capability the rest of the library consumes ([`RemoteStore`]) and ships
//! two implementations:
//!
//! - [`MemoryStore`]: in-process store, used for tests and embedding
//! - [`RestStore`]: realtime-database REST client with server-sent-event
//!   subscriptions (feature `rest`)
//!
//! # Examples
//!
//! ```
//! use relaysync_lib::store::{MemoryStore, RemoteStore, StoreEvent, StorePath};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> relaysync_lib::Result<()> {
//! let store = MemoryStore::with_data(json!({"relay": {"relay1": false}}));
//! let relay = StorePath::new("relay")?;
//!
//! let mut subscription = store.subscribe(&relay)?;
//! store.write(&relay.child("relay1")?, json!(true))?;
//!
//! // Initial value first, then the change.
//! let Some(StoreEvent::Changed(first)) = subscription.next().await else { panic!() };
//! assert_eq!(first.child("relay1").as_bool(), Some(false));
//! let Some(StoreEvent::Changed(second)) = subscription.next().await else { panic!() };
//! assert_eq!(second.child("relay1").as_bool(), Some(true));
//! # Ok(())
//! # }
//! ```

mod memory;
mod path;
#[cfg(feature = "rest")]
mod rest;
mod snapshot;
#[cfg(feature = "rest")]
mod sse;
mod subscription;
mod tree;

pub use memory::{MemoryStore, WriteRecord};
pub(crate) use path::is_valid_segment;
pub use path::StorePath;
#[cfg(feature = "rest")]
pub use rest::{RestStore, StoreConfig};
pub use snapshot::Snapshot;
pub use subscription::Subscription;

use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreError;

/// A notification delivered to a [`Subscription`].
#[derive(Debug)]
pub enum StoreEvent {
    /// The data at the subscribed path is now `Snapshot`.
    Changed(Snapshot),
    /// The store reported a failure for the subscribed path.
    Failed(StoreError),
}

/// The capability a remote store must provide.
///
/// Both operations return immediately. `subscribe` hands back a stream that
/// first yields the current value and then every later change, in order.
/// `write` is fire-and-forget: an `Ok` means the write was issued, not that
/// it was applied.
pub trait RemoteStore: Send + Sync {
    /// Subscribes to changes of the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the subscription cannot be started.
    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError>;

    /// Overwrites the value at `path`. A `null` value deletes it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write cannot be issued.
    fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        (**self).subscribe(path)
    }

    fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        (**self).write(path, value)
    }
}
