// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vital-quirk response schemas.
//!
//! Newer devices report camelCase fields and `0`/`1` integer switches.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Status payload of vital purifiers.
///
/// `fanSpeedLevel` is the level the fan actually runs at (`255` in sleep),
/// `manualSpeedLevel` the preset restored by manual mode.
///
/// # Examples
///
/// ```
/// use vesync_lib::response::vital::VitalPurifierStatus;
///
/// let json = r#"{"powerSwitch": 1, "workMode": "manual", "manualSpeedLevel": 3,
///                "fanSpeedLevel": 3, "AQLevel": 2, "PM25": 14,
///                "autoPreference": {"autoPreferenceType": "quiet", "roomSize": 0}}"#;
/// let status: VitalPurifierStatus = serde_json::from_str(json).unwrap();
/// assert_eq!(status.aq_level, Some(2));
/// assert_eq!(status.auto_preference.unwrap().auto_preference_type, "quiet");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalPurifierStatus {
    /// Power switch.
    #[serde(default)]
    pub power_switch: Option<u8>,
    /// Filter life in percent.
    #[serde(default)]
    pub filter_life_percent: Option<u8>,
    /// Operating mode.
    #[serde(default)]
    pub work_mode: Option<String>,
    /// Manual preset level.
    #[serde(default)]
    pub manual_speed_level: Option<u8>,
    /// Current fan level.
    #[serde(default)]
    pub fan_speed_level: Option<u8>,
    /// Air quality index.
    #[serde(default, rename = "AQLevel")]
    pub aq_level: Option<u8>,
    /// PM2.5 concentration.
    #[serde(default, rename = "PM25")]
    pub pm25: Option<u16>,
    /// Display switch.
    #[serde(default)]
    pub screen_switch: Option<u8>,
    /// Child lock switch.
    #[serde(default)]
    pub child_lock_switch: Option<u8>,
    /// Light detection switch.
    #[serde(default)]
    pub light_detection_switch: Option<u8>,
    /// Auto-mode preference.
    #[serde(default)]
    pub auto_preference: Option<VitalAutoPreference>,
    /// Seconds left on the running timer.
    #[serde(default)]
    pub timer_remain: Option<u32>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Auto-mode preference block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalAutoPreference {
    /// Preference kind.
    pub auto_preference_type: String,
    /// Room size in square feet.
    #[serde(default)]
    pub room_size: u16,
}

/// Status payload of vital humidifiers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalHumidifierStatus {
    /// Power switch.
    #[serde(default)]
    pub power_switch: Option<u8>,
    /// Measured humidity.
    #[serde(default)]
    pub humidity: Option<u8>,
    /// Target humidity.
    #[serde(default)]
    pub target_humidity: Option<u8>,
    /// Mist level as shown in the app.
    #[serde(default)]
    pub virtual_level: Option<u8>,
    /// Raw mist level.
    #[serde(default)]
    pub mist_level: Option<u8>,
    /// Operating mode; `"autoPro"` on the wire means auto.
    #[serde(default)]
    pub work_mode: Option<String>,
    /// Water tank empty state.
    #[serde(default)]
    pub water_lacks_state: Option<u8>,
    /// Water tank removed.
    #[serde(default)]
    pub water_tank_lifted: Option<u8>,
    /// Display switch.
    #[serde(default)]
    pub screen_switch: Option<u8>,
    /// Child lock switch.
    #[serde(default)]
    pub child_lock_switch: Option<u8>,
    /// Seconds left on the running timer.
    #[serde(default)]
    pub timer_remain: Option<u32>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Status payload of vital tower fans.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalFanStatus {
    /// Power switch.
    #[serde(default)]
    pub power_switch: Option<u8>,
    /// Operating mode.
    #[serde(default)]
    pub work_mode: Option<String>,
    /// Current fan level.
    #[serde(default)]
    pub fan_speed_level: Option<u8>,
    /// Manual preset level.
    #[serde(default)]
    pub manual_speed_level: Option<u8>,
    /// Display switch.
    #[serde(default)]
    pub screen_switch: Option<u8>,
    /// Oscillation switch.
    #[serde(default)]
    pub oscillation_switch: Option<u8>,
    /// Ambient temperature in tenths of a degree Fahrenheit.
    #[serde(default)]
    pub temperature: Option<i32>,
    /// Seconds left on the running timer.
    #[serde(default)]
    pub timer_remain: Option<u32>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Timer list payload (`getTimerV2`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitalTimerList {
    /// Timers; `null` when none exist.
    #[serde(default)]
    pub timers: Option<Vec<VitalTimerEntry>>,
}

/// One timer in a [`VitalTimerList`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalTimerEntry {
    /// Vendor timer id.
    pub id: u64,
    /// Whether the timer is armed.
    #[serde(default)]
    pub enabled: bool,
    /// Actions run on expiry.
    #[serde(default)]
    pub start_act: Vec<VitalTimerAct>,
    /// Expiry trigger.
    #[serde(default)]
    pub tmg_evt: Option<VitalTimerEvent>,
}

/// Action of a [`VitalTimerEntry`].
#[derive(Debug, Clone, Deserialize)]
pub struct VitalTimerAct {
    /// Target of the action, `"powerSwitch"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `0` turns off, `1` turns on.
    #[serde(default)]
    pub act: u8,
}

/// Trigger of a [`VitalTimerEntry`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalTimerEvent {
    /// Seconds until expiry.
    #[serde(default)]
    pub clk_sec: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidifier_fields() {
        let json = r#"{"powerSwitch": 1, "humidity": 38, "targetHumidity": 50,
                       "virtualLevel": 4, "workMode": "autoPro", "waterLacksState": 0}"#;
        let status: VitalHumidifierStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.work_mode.as_deref(), Some("autoPro"));
        assert_eq!(status.virtual_level, Some(4));
        assert!(status.extra.is_empty());
    }

    #[test]
    fn fan_fields() {
        let json = r#"{"powerSwitch": 0, "workMode": "turbo", "fanSpeedLevel": 12,
                       "oscillationSwitch": 1, "muteSwitch": 0}"#;
        let status: VitalFanStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.oscillation_switch, Some(1));
        assert_eq!(status.extra["muteSwitch"], 0);
    }

    #[test]
    fn timer_v2_list() {
        let json = r#"{"timers": [{"id": 9, "enabled": true,
                        "startAct": [{"type": "powerSwitch", "num": 0, "act": 0}],
                        "tmgEvt": {"clkSec": 1800}}]}"#;
        let list: VitalTimerList = serde_json::from_str(json).unwrap();
        let timers = list.timers.unwrap();
        assert_eq!(timers[0].start_act[0].act, 0);
        assert_eq!(timers[0].tmg_evt.as_ref().unwrap().clk_sec, 1800);
    }
}
