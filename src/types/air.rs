// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air quality readings and auto-mode preferences.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Air quality index reported by purifiers with a sensor.
///
/// `1` is the best reading and `4` the worst. Legacy models report a label
/// instead of a number; [`AirQuality::from_label`] maps it onto the same
/// scale.
///
/// # Examples
///
/// ```
/// use vesync_lib::types::AirQuality;
///
/// assert_eq!(AirQuality::from_label("good"), Some(AirQuality::new(2).unwrap()));
/// assert_eq!(AirQuality::new(4).unwrap().label(), "very poor");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AirQuality(u8);

impl AirQuality {
    /// Best reading.
    pub const EXCELLENT: Self = Self(1);
    /// Worst reading.
    pub const VERY_POOR: Self = Self(4);

    /// Creates an index, or `None` outside 1-4.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if level >= 1 && level <= 4 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// Maps a legacy air quality label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "excellent" => Some(Self(1)),
            "good" => Some(Self(2)),
            "moderate" => Some(Self(3)),
            "inferior" | "bad" | "very poor" => Some(Self(4)),
            _ => None,
        }
    }

    /// Returns the index.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.0
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.0 {
            1 => "excellent",
            2 => "good",
            3 => "moderate",
            _ => "very poor",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Auto-mode preference of purifiers that support it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutoPreference {
    /// Preference kind, e.g. `"default"`, `"efficient"`, `"quiet"`.
    pub kind: String,
    /// Room size in square feet; only meaningful for `"efficient"`.
    pub room_size: u16,
}

impl AutoPreference {
    /// Creates a preference.
    #[must_use]
    pub fn new(kind: impl Into<String>, room_size: u16) -> Self {
        Self {
            kind: kind.into(),
            room_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_quality_bounds() {
        assert!(AirQuality::new(0).is_none());
        assert!(AirQuality::new(5).is_none());
        assert_eq!(AirQuality::new(1), Some(AirQuality::EXCELLENT));
    }

    #[test]
    fn air_quality_labels() {
        assert_eq!(AirQuality::from_label("Excellent").map(|q| q.level()), Some(1));
        assert_eq!(AirQuality::from_label("inferior"), Some(AirQuality::VERY_POOR));
        assert_eq!(AirQuality::from_label("smoky"), None);
        assert_eq!(AirQuality::new(3).unwrap().to_string(), "moderate");
    }
}
