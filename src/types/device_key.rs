// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier of a single relay in the store.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::store::is_valid_segment;

/// A short identifier naming one controllable relay, such as `"relay1"`.
///
/// Keys read back from the store are taken verbatim, whatever they contain.
/// Keys built with [`DeviceKey::new`] are checked to be a legal store path
/// segment so that writes always land on a single child.
///
/// # Examples
///
/// ```
/// use relaysync_lib::types::DeviceKey;
///
/// let key = DeviceKey::new("relay3").unwrap();
/// assert_eq!(key.as_str(), "relay3");
/// assert!(key.is_schedulable());
///
/// assert!(DeviceKey::new("relay/3").is_err());
/// assert!(DeviceKey::new("").is_err());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DeviceKey(String);

impl DeviceKey {
    /// Prefix shared by every key that may take part in the schedule.
    pub const SCHEDULE_PREFIX: &'static str = "relay";

    /// Creates a validated device key.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidDeviceKey` if the key is empty or contains
    /// one of `/ . # $ [ ]`.
    pub fn new(key: impl Into<String>) -> Result<Self, ValueError> {
        let key = key.into();
        if !is_valid_segment(&key) {
            return Err(ValueError::InvalidDeviceKey(key));
        }
        Ok(Self(key))
    }

    /// Wraps a key exactly as the store reported it.
    pub(crate) fn from_store(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the key carries the `relay` prefix used by the
    /// schedule inclusion flags.
    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        self.0.starts_with(Self::SCHEDULE_PREFIX)
    }

    /// Splits the key into its text stem and trailing number, if any.
    ///
    /// `"relay12"` becomes `("relay", Some(12))`, `"pump"` becomes
    /// `("pump", None)`.
    #[must_use]
    pub fn split_numeric(&self) -> (&str, Option<u64>) {
        let stem = self.0.trim_end_matches(|c: char| c.is_ascii_digit());
        let digits = &self.0[stem.len()..];
        (stem, digits.parse().ok())
    }

    /// Compares keys so that numbered keys sort by value (`relay2` before
    /// `relay10`).
    #[must_use]
    pub fn natural_cmp(&self, other: &Self) -> std::cmp::Ordering {
        let (stem_a, num_a) = self.split_numeric();
        let (stem_b, num_b) = other.split_numeric();
        stem_a
            .cmp(stem_b)
            .then(num_a.cmp(&num_b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceKey {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DeviceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_illegal_segments() {
        for bad in ["", "a/b", "a.b", "a#b", "a$b", "a[b", "a]b"] {
            assert_eq!(
                DeviceKey::new(bad),
                Err(ValueError::InvalidDeviceKey(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn store_keys_are_taken_verbatim() {
        let key = DeviceKey::from_store("weird.key");
        assert_eq!(key.as_str(), "weird.key");
    }

    #[test]
    fn schedulable_prefix() {
        assert!(DeviceKey::new("relay1").unwrap().is_schedulable());
        assert!(DeviceKey::new("relayX").unwrap().is_schedulable());
        assert!(!DeviceKey::new("enabled").unwrap().is_schedulable());
        assert!(!DeviceKey::new("pump").unwrap().is_schedulable());
    }

    #[test]
    fn split_numeric_suffix() {
        let key = DeviceKey::new("relay12").unwrap();
        assert_eq!(key.split_numeric(), ("relay", Some(12)));

        let key = DeviceKey::new("pump").unwrap();
        assert_eq!(key.split_numeric(), ("pump", None));
    }

    #[test]
    fn natural_ordering() {
        let mut keys: Vec<DeviceKey> = ["relay10", "relay2", "fan", "relay1"]
            .into_iter()
            .map(|k| DeviceKey::new(k).unwrap())
            .collect();
        keys.sort_by(DeviceKey::natural_cmp);

        let names: Vec<&str> = keys.iter().map(DeviceKey::as_str).collect();
        assert_eq!(names, ["fan", "relay1", "relay2", "relay10"]);
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = DeviceKey::new("relay4").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"relay4\"");
    }
}
