// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `RelaySync` Lib - Mirror home relays and their schedule through a realtime
//! key/value store.
//!
//! The store is the system of record. This library subscribes to two of its
//! paths, projects them into local observable state, and turns user intents
//! into single-field writes. It contains no relay protocol and no scheduling
//! engine: devices and their controller read the same store.
//!
//! # Store Layout
//!
//! ```text
//! relay/
//!   <deviceKey>: boolean
//! schedule/
//!   enabled: boolean
//!   onTime:  "H:MM AM|PM"
//!   offTime: "H:MM AM|PM"
//!   <deviceKey>: boolean
//! ```
//!
//! # Components
//!
//! - **Store** ([`store`]): the [`RemoteStore`](store::RemoteStore) trait, an
//!   in-memory store and a REST client with server-sent-event subscriptions
//! - **Projectors** ([`projector`]): decode `relay` into a [`RelaySnapshot`]
//!   and `schedule` into a [`ScheduleConfig`]
//! - **Commands** ([`command`]): fire-and-forget overwrites of one field
//! - **Session** ([`session`]): identity capability and [`SyncSession`],
//!   which wires everything together
//! - **Catalog** ([`catalog`]): labels and display order
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relaysync_lib::session::{LocalIdentity, Session, SyncConfig, SyncSession};
//! use relaysync_lib::store::StoreConfig;
//! use relaysync_lib::types::{DeviceKey, ScheduleTime};
//!
//! #[tokio::main]
//! async fn main() -> relaysync_lib::Result<()> {
//!     let store = StoreConfig::new("my-home.example-rtdb.com")
//!         .with_auth_token("secret")
//!         .into_store()?;
//!
//!     let sync = SyncSession::start(
//!         Arc::new(store),
//!         Session::new(LocalIdentity::signed_in()),
//!         SyncConfig::default(),
//!     )?;
//!
//!     // Wait for the first relay snapshot.
//!     let mut relays = sync.watch_relays();
//!     relays.changed().await.ok();
//!     println!("{} relays known", relays.borrow().len());
//!
//!     let dispatcher = sync.dispatcher();
//!     dispatcher.set_relay(&DeviceKey::new("relay1")?, true)?;
//!     dispatcher.set_on_time(ScheduleTime::new(18, 0)?)?;
//!     dispatcher.set_schedule_enabled(true)?;
//!
//!     sync.sign_out();
//!     Ok(())
//! }
//! ```
//!
//! ## Callbacks
//!
//! ```no_run
//! use relaysync_lib::subscription::Subscribable;
//! # use std::sync::Arc;
//! # use relaysync_lib::session::{LocalIdentity, Session, SyncConfig, SyncSession};
//! # use relaysync_lib::store::MemoryStore;
//! # #[tokio::main]
//! # async fn main() -> relaysync_lib::Result<()> {
//! # let sync = SyncSession::start(Arc::new(MemoryStore::new()), Session::new(LocalIdentity::signed_in()), SyncConfig::default())?;
//!
//! sync.on_relays_changed(|relays| {
//!     println!("{} of {} on", relays.active_count(), relays.len());
//! });
//! sync.on_status_changed(|kind, status| {
//!     println!("{kind} projector is now {status:?}");
//! });
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod command;
pub mod error;
pub mod projector;
pub mod session;
pub mod state;
pub mod store;
pub mod subscription;
pub mod types;

pub use catalog::RelayCatalog;
pub use command::{Command, CommandDispatcher, RelayCommand, ScheduleCommand, StoreLayout};
pub use error::{Error, Result, StoreError, ValueError};
pub use projector::{ProjectorKind, ProjectorStatus, decode_relays, decode_schedule};
pub use session::{IdentityProvider, LocalIdentity, Session, SyncConfig, SyncSession};
pub use state::{RelaySnapshot, ScheduleConfig};
#[cfg(feature = "rest")]
pub use store::{RestStore, StoreConfig};
pub use store::{MemoryStore, RemoteStore, StorePath};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{DeviceKey, ScheduleTime, format_to_12_hour};
