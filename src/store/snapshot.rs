// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only view of the data stored at one path.

use serde_json::Value;

use super::StorePath;

/// The data found at a store location when a notification was emitted.
///
/// Typed accessors never fail: they return `None` (or a default) when the
/// value is absent or of another type.
///
/// # Examples
///
/// ```
/// use relaysync_lib::store::Snapshot;
/// use serde_json::json;
///
/// let snapshot = Snapshot::new(Some("schedule"), json!({
///     "enabled": true,
///     "onTime": "6:00 PM",
/// }));
///
/// assert!(snapshot.child("enabled").bool_or_default());
/// assert_eq!(snapshot.child("onTime").string_or_default(), "6:00 PM");
/// assert_eq!(snapshot.child("offTime").string_or_default(), "");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    key: Option<String>,
    value: Value,
}

impl Snapshot {
    /// Creates a snapshot for a location named `key`.
    #[must_use]
    pub fn new(key: Option<&str>, value: Value) -> Self {
        Self {
            key: key.map(str::to_string),
            value,
        }
    }

    /// Creates a snapshot of `value` stored at `path`.
    #[must_use]
    pub fn at(path: &StorePath, value: Value) -> Self {
        Self::new(path.last(), value)
    }

    /// Returns the last key of the snapshot's location (`None` at the root).
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the snapshot and returns the raw JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Returns `true` if anything is stored at this location.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// Returns the snapshot of an immediate child.
    ///
    /// A missing child yields an empty snapshot rather than an error.
    #[must_use]
    pub fn child(&self, key: &str) -> Snapshot {
        let value = match &self.value {
            Value::Object(map) => map.get(key).cloned(),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            _ => None,
        };
        Snapshot::new(Some(key), value.unwrap_or(Value::Null))
    }

    /// Returns all immediate children that hold a value.
    ///
    /// Scalars have no children. Arrays, which the store produces for
    /// dense numeric keys, are enumerated by index.
    #[must_use]
    pub fn children(&self) -> Vec<Snapshot> {
        match &self.value {
            Value::Object(map) => map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| Snapshot::new(Some(k.as_str()), v.clone()))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| Snapshot::new(Some(i.to_string().as_str()), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// Returns the value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Returns the boolean value, or `false` when absent or mistyped.
    #[must_use]
    pub fn bool_or_default(&self) -> bool {
        self.as_bool().unwrap_or(false)
    }

    /// Returns the string value, or an empty string when absent or mistyped.
    #[must_use]
    pub fn string_or_default(&self) -> String {
        self.as_str().unwrap_or_default().to_string()
    }
}
