// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `RelaySync` library.
//!
//! Decoding data coming *from* the store never fails: missing or mistyped
//! fields fall back to defaults. Errors only arise when building values that
//! go *to* the store, or when the store itself cannot be reached.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the remote store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("{field} value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the constrained field.
        field: &'static str,
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// A device key is not a legal store path segment.
    #[error("invalid device key: {0:?}")]
    InvalidDeviceKey(String),

    /// A store path contains an illegal segment.
    #[error("invalid store path: {0:?}")]
    InvalidPath(String),

    /// A time string is not in `H:MM AM|PM` form.
    #[error("invalid schedule time: {0:?}")]
    InvalidTime(String),

    /// The device key cannot take part in the schedule.
    #[error("device key {0:?} cannot be scheduled (must start with \"relay\")")]
    NotSchedulable(String),
}

/// Errors reported by a remote store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[cfg(feature = "rest")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The store rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The store cancelled the subscription (typically a rules change).
    #[error("subscription cancelled by the store")]
    Cancelled,

    /// The event stream ended.
    #[error("event stream closed")]
    StreamClosed,

    /// The event stream carried a frame that could not be understood.
    #[error("malformed stream event: {0}")]
    MalformedEvent(String),

    /// The store is unreachable or reported a failure for a path.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// No tokio runtime was available to run background work.
    #[error("no async runtime available")]
    NoRuntime,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
