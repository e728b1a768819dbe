// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions to projected state.
//!
//! Watch receivers (see [`SyncSession::watch_relays`]) suit async code that
//! wants the latest value. Callbacks suit code that reacts to every change
//! without polling.
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that manages callbacks and dispatches events
//! - [`Subscribable`] - Trait for types that support callback subscriptions
//!
//! [`SyncSession::watch_relays`]: crate::session::SyncSession::watch_relays

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
