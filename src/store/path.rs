// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slash-separated paths into the store's key space.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::types::DeviceKey;

/// Characters the store does not allow inside a key.
const FORBIDDEN: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Returns `true` if `segment` can be used as a single store key.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(FORBIDDEN)
}

/// A location in the store, such as `relay/relay1` or `schedule/onTime`.
///
/// Leading, trailing and repeated slashes are ignored, so `"/relay/"` and
/// `"relay"` name the same location. The empty path is the root.
///
/// # Examples
///
/// ```
/// use relaysync_lib::store::StorePath;
///
/// let relay = StorePath::new("relay").unwrap();
/// let one = relay.child("relay1").unwrap();
/// assert_eq!(one.to_string(), "relay/relay1");
/// assert!(one.starts_with(&relay));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Returns the root path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a slash-separated path.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPath` if any segment contains a character
    /// the store forbids in keys.
    pub fn new(path: &str) -> Result<Self, ValueError> {
        let parsed = Self::parse_lenient(path);
        if parsed.segments.iter().all(|s| is_valid_segment(s)) {
            Ok(parsed)
        } else {
            Err(ValueError::InvalidPath(path.to_string()))
        }
    }

    /// Splits a path reported by the store without validating it.
    pub(crate) fn parse_lenient(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Returns a new path one level below this one.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPath` if `segment` is not a legal key.
    pub fn child(&self, segment: &str) -> Result<Self, ValueError> {
        if !is_valid_segment(segment) {
            return Err(ValueError::InvalidPath(format!("{self}/{segment}")));
        }
        Ok(self.join_unchecked(segment))
    }

    /// Returns the path of a device below this one.
    #[must_use]
    pub fn device(&self, key: &DeviceKey) -> Self {
        self.join_unchecked(key.as_str())
    }

    pub(crate) fn join_unchecked(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the individual keys of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last key, or `None` at the root.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns `true` if `prefix` is this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &StorePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns `true` if a change at one path can affect data at the other.
    #[must_use]
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for StorePath {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
