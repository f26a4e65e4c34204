// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legacy-flat response schema.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Detail response of the oldest purifier endpoint.
///
/// Fields sit at the top level of the body next to the envelope.
///
/// # Examples
///
/// ```
/// use vesync_lib::response::legacy::LegacyDetails;
///
/// let json = r#"{
///     "code": 0, "deviceStatus": "on", "connectionStatus": "online",
///     "mode": "manual", "level": 2, "airQuality": "excellent",
///     "filterLife": {"percent": 87}, "screenStatus": "on"
/// }"#;
/// let details: LegacyDetails = serde_json::from_str(json).unwrap();
/// assert_eq!(details.level, Some(2));
/// assert_eq!(details.filter_life.unwrap().percent, Some(87));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDetails {
    /// Envelope code; classified separately.
    #[serde(default)]
    pub code: Option<Value>,
    /// Envelope message.
    #[serde(default)]
    pub msg: Option<String>,
    /// Request trace id echoed by the vendor.
    #[serde(default)]
    pub trace_id: Option<Value>,
    /// `"on"` or `"off"`.
    #[serde(default)]
    pub device_status: Option<String>,
    /// `"online"` or `"offline"`.
    #[serde(default)]
    pub connection_status: Option<String>,
    /// Minutes the device has been running.
    #[serde(default)]
    pub active_time: Option<u64>,
    /// Filter state.
    #[serde(default)]
    pub filter_life: Option<LegacyFilterLife>,
    /// `"on"` or `"off"`.
    #[serde(default)]
    pub screen_status: Option<String>,
    /// Operating mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// Fan level; `null` outside manual mode.
    #[serde(default)]
    pub level: Option<u8>,
    /// Air quality label, e.g. `"good"`.
    #[serde(default)]
    pub air_quality: Option<String>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filter state of a legacy purifier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyFilterLife {
    /// Remaining life in percent.
    #[serde(default)]
    pub percent: Option<u8>,
    /// Vendor change-filter flag.
    #[serde(default)]
    pub change: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_land_in_extra() {
        let json = r#"{"code": 0, "deviceStatus": "off", "deviceImg": "x.png"}"#;
        let details: LegacyDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.device_status.as_deref(), Some("off"));
        assert_eq!(details.extra.len(), 1);
        assert_eq!(details.extra["deviceImg"], "x.png");
    }

    #[test]
    fn null_level_is_none() {
        let json = r#"{"mode": "auto", "level": null}"#;
        let details: LegacyDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.level, None);
    }
}
