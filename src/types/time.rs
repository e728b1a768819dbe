// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-of-day values for the relay schedule.
//!
//! The store keeps schedule times as display strings in the 12-hour form
//! `H:MM AM|PM`: no leading zero on the hour, a zero-padded minute. An empty
//! string means "unset".
//!
//! # Types
//!
//! - [`ScheduleTime`] - A validated hour/minute pair
//!
//! # Functions
//!
//! - [`format_to_12_hour`] - Render a 24-hour `(hour, minute)` pair

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::error::ValueError;

/// Format string used to parse stored times back.
const DISPLAY_FORMAT: &str = "%I:%M %p";

/// Formats a 24-hour time as the schedule's 12-hour display string.
///
/// The hour is taken modulo 12 with `0` shown as `12`. Hours below 12 are
/// `AM`, the rest `PM`. The minute is always two digits.
///
/// Inputs are not range checked; use [`ScheduleTime::new`] for that.
///
/// # Examples
///
/// ```
/// use relaysync_lib::types::format_to_12_hour;
///
/// assert_eq!(format_to_12_hour(0, 5), "12:05 AM");
/// assert_eq!(format_to_12_hour(12, 0), "12:00 PM");
/// assert_eq!(format_to_12_hour(13, 0), "1:00 PM");
/// assert_eq!(format_to_12_hour(23, 59), "11:59 PM");
/// ```
#[must_use]
pub fn format_to_12_hour(hour: u32, minute: u32) -> String {
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    format!("{display_hour}:{minute:02} {meridiem}")
}

/// A time of day at minute resolution, as used for `onTime` and `offTime`.
///
/// # Examples
///
/// ```
/// use relaysync_lib::types::ScheduleTime;
///
/// let on = ScheduleTime::new(18, 30).unwrap();
/// assert_eq!(on.to_string(), "6:30 PM");
///
/// let parsed: ScheduleTime = "6:30 PM".parse().unwrap();
/// assert_eq!(parsed, on);
///
/// assert!(ScheduleTime::new(24, 0).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    /// Creates a schedule time from a 24-hour hour and a minute.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `hour > 23` or `minute > 59`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValueError> {
        if hour > 23 {
            return Err(ValueError::OutOfRange {
                field: "hour",
                min: 0,
                max: 23,
                actual: hour,
            });
        }
        if minute > 59 {
            return Err(ValueError::OutOfRange {
                field: "minute",
                min: 0,
                max: 59,
                actual: minute,
            });
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ValueError::InvalidTime(format!("{hour}:{minute}")))
    }

    /// Returns the hour in 24-hour form (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Returns the underlying `chrono` time.
    #[must_use]
    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }

    /// Returns the `H:MM AM|PM` string written to the store.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        format_to_12_hour(self.hour(), self.minute())
    }
}

impl From<NaiveTime> for ScheduleTime {
    /// Drops seconds and sub-seconds.
    fn from(time: NaiveTime) -> Self {
        let truncated = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self(truncated)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl FromStr for ScheduleTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, DISPLAY_FORMAT)
            .map(Self)
            .map_err(|_| ValueError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleTime> for String {
    fn from(time: ScheduleTime) -> Self {
        time.to_display_string()
    }
}
