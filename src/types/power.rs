// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and connectivity status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Power status of a device.
///
/// The vendor reports power as `"on"`/`"off"` strings (legacy), booleans
/// (bypass) or `0`/`1` switches (newer models); all normalize to this.
///
/// # Examples
///
/// ```
/// use vesync_lib::types::PowerStatus;
///
/// assert_eq!("on".parse::<PowerStatus>().unwrap(), PowerStatus::On);
/// assert_eq!(PowerStatus::from(false), PowerStatus::Off);
/// assert_eq!(PowerStatus::On.as_switch(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    /// Device is off.
    #[default]
    Off,
    /// Device is on.
    On,
}

impl PowerStatus {
    /// Returns the vendor string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns the numeric switch value used by newer models.
    #[must_use]
    pub const fn as_switch(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Returns `true` if on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the opposite status.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerStatus(s.to_string())),
        }
    }
}

impl From<bool> for PowerStatus {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Cloud connectivity of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// The cloud can reach the device.
    Online,
    /// The cloud reports the device as unreachable.
    #[default]
    Offline,
}

impl Connectivity {
    /// Returns `true` if online.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "online",
            Self::Offline => "offline",
        })
    }
}

impl Connectivity {
    /// Parses the legacy `connectionStatus` string; anything but
    /// `"online"` counts as offline.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        if status.eq_ignore_ascii_case("online") {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_status_parse() {
        assert_eq!("ON".parse::<PowerStatus>().unwrap(), PowerStatus::On);
        assert_eq!("off".parse::<PowerStatus>().unwrap(), PowerStatus::Off);
        assert_eq!("1".parse::<PowerStatus>().unwrap(), PowerStatus::On);
        assert!("dim".parse::<PowerStatus>().is_err());
    }

    #[test]
    fn power_status_toggle() {
        assert_eq!(PowerStatus::On.toggled(), PowerStatus::Off);
        assert_eq!(PowerStatus::Off.toggled(), PowerStatus::On);
    }

    #[test]
    fn power_status_default_is_off() {
        assert_eq!(PowerStatus::default(), PowerStatus::Off);
    }

    #[test]
    fn connectivity_serde() {
        let c: Connectivity = serde_json::from_str(r#""online""#).unwrap();
        assert!(c.is_online());
        assert_eq!(serde_json::to_string(&Connectivity::Offline).unwrap(), r#""offline""#);
        assert_eq!(Connectivity::from_status("Online"), Connectivity::Online);
        assert_eq!(Connectivity::from_status("unknown"), Connectivity::Offline);
    }
}
