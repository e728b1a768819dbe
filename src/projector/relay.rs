// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay state projector.

use super::{ProjectionObserver, Projector, ProjectorKind};
use crate::error::StoreError;
use crate::state::RelaySnapshot;
use crate::store::{RemoteStore, Snapshot, StorePath};

/// Projector of the `relay` path.
pub type RelayProjector = Projector<RelaySnapshot>;

/// Decodes the value stored under the relay path.
///
/// Every child becomes one entry; a non-boolean value reads as off.
#[must_use]
pub fn decode_relays(snapshot: &Snapshot) -> RelaySnapshot {
    RelaySnapshot::decode(snapshot)
}

impl Projector<RelaySnapshot> {
    /// Starts projecting the relays stored at `path`.
    ///
    /// # Errors
    ///
    /// See [`Projector::start`].
    pub fn relays<S, O>(store: &S, path: &StorePath, observer: O) -> Result<Self, StoreError>
    where
        S: RemoteStore + ?Sized,
        O: ProjectionObserver<RelaySnapshot> + 'static,
    {
        Self::start(store, path, ProjectorKind::Relays, decode_relays, observer)
    }
}
