// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schedule state projector.
//!
//! The four schedule fields share one watch channel, so a notification that
//! changes several of them is observed as a single update.

use super::{ProjectionObserver, Projector, ProjectorKind};
use crate::error::StoreError;
use crate::state::ScheduleConfig;
use crate::store::{RemoteStore, Snapshot, StorePath};

/// Projector of the `schedule` path.
pub type ScheduleProjector = Projector<ScheduleConfig>;

/// Decodes the value stored under the schedule path.
#[must_use]
pub fn decode_schedule(snapshot: &Snapshot) -> ScheduleConfig {
    ScheduleConfig::decode(snapshot)
}

impl Projector<ScheduleConfig> {
    /// Starts projecting the schedule stored at `path`.
    ///
    /// # Errors
    ///
    /// See [`Projector::start`].
    pub fn schedule<S, O>(store: &S, path: &StorePath, observer: O) -> Result<Self, StoreError>
    where
        S: RemoteStore + ?Sized,
        O: ProjectionObserver<ScheduleConfig> + 'static,
    {
        Self::start(store, path, ProjectorKind::Schedule, decode_schedule, observer)
    }
}
