// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity and the running synchronization session.
//!
//! Authentication is delegated to an external provider. The library only
//! needs to know whether someone is signed in and how to sign them out,
//! which the [`IdentityProvider`] trait captures. A [`Session`] carries the
//! provider explicitly; there is no global identity.
//!
//! [`SyncSession`] ties a store, both projectors and the command dispatcher
//! together for the lifetime of a signed-in user.

mod config;
mod identity;
mod sync_session;

pub use config::SyncConfig;
pub use identity::{IdentityProvider, LocalIdentity, Session};
pub use sync_session::SyncSession;
