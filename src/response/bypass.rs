// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bypass-v1/v2 response schemas.
//!
//! These describe the `result.result` payload; the envelope around it is
//! classified by [`classify`](super::classify).

use serde::Deserialize;
use serde_json::{Map, Value};

/// Status payload of bypass purifiers (`getPurifierStatus`).
///
/// # Examples
///
/// ```
/// use vesync_lib::response::bypass::BypassPurifierStatus;
///
/// let json = r#"{"enabled": true, "mode": "manual", "level": 3, "air_quality": 1,
///                "air_quality_value": 4, "display": true, "child_lock": false,
///                "filter_life": 92, "extension": {"timer_remain": 0}}"#;
/// let status: BypassPurifierStatus = serde_json::from_str(json).unwrap();
/// assert_eq!(status.level, Some(3));
/// assert_eq!(status.air_quality_value, Some(4));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BypassPurifierStatus {
    /// Power.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Filter life in percent.
    #[serde(default)]
    pub filter_life: Option<u8>,
    /// Operating mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// Fan level; `null` or `0` outside manual mode.
    #[serde(default)]
    pub level: Option<u8>,
    /// Air quality index.
    #[serde(default)]
    pub air_quality: Option<u8>,
    /// PM2.5 concentration.
    #[serde(default)]
    pub air_quality_value: Option<u16>,
    /// Display.
    #[serde(default)]
    pub display: Option<bool>,
    /// Child lock.
    #[serde(default)]
    pub child_lock: Option<bool>,
    /// Night light, `"on"`, `"off"` or `"dim"`.
    #[serde(default)]
    pub night_light: Option<String>,
    /// Persisted device configuration.
    #[serde(default)]
    pub configuration: Option<Value>,
    /// Runtime extension block.
    #[serde(default)]
    pub extension: Option<BypassExtension>,
    /// Hardware error code.
    #[serde(default)]
    pub device_error_code: Option<i64>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `extension` block of a bypass purifier status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BypassExtension {
    /// Seconds left on the running timer; `0` when none.
    #[serde(default)]
    pub timer_remain: Option<u32>,
    /// Number of configured schedules.
    #[serde(default)]
    pub schedule_count: Option<u32>,
}

/// Status payload of bypass humidifiers (`getHumidifierStatus`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BypassHumidifierStatus {
    /// Power.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Measured humidity.
    #[serde(default)]
    pub humidity: Option<u8>,
    /// Mist level as shown in the app.
    #[serde(default)]
    pub mist_virtual_level: Option<u8>,
    /// Raw mist level.
    #[serde(default)]
    pub mist_level: Option<u8>,
    /// Operating mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// Water tank empty.
    #[serde(default)]
    pub water_lacks: Option<bool>,
    /// Humidity above target.
    #[serde(default)]
    pub humidity_high: Option<bool>,
    /// Water tank removed.
    #[serde(default)]
    pub water_tank_lifted: Option<bool>,
    /// Display.
    #[serde(default)]
    pub display: Option<bool>,
    /// Stops when the target humidity is reached.
    #[serde(default)]
    pub automatic_stop_reach_target: Option<bool>,
    /// Night light brightness.
    #[serde(default)]
    pub night_light_brightness: Option<u8>,
    /// Warm mist active.
    #[serde(default)]
    pub warm_enabled: Option<bool>,
    /// Warm mist level.
    #[serde(default)]
    pub warm_level: Option<u8>,
    /// Persisted configuration.
    #[serde(default)]
    pub configuration: Option<HumidifierConfiguration>,
    /// Fields not claimed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `configuration` block of a bypass humidifier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HumidifierConfiguration {
    /// Target humidity in auto mode.
    #[serde(default)]
    pub auto_target_humidity: Option<u8>,
    /// Display setting.
    #[serde(default)]
    pub display: Option<bool>,
    /// Automatic stop setting.
    #[serde(default)]
    pub automatic_stop: Option<bool>,
}

/// Timer list payload (`getTimer`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerList {
    /// Timers; the vendor returns `null` when none exist.
    #[serde(default)]
    pub timers: Option<Vec<TimerEntry>>,
}

/// One timer in a [`TimerList`].
#[derive(Debug, Clone, Deserialize)]
pub struct TimerEntry {
    /// Vendor timer id.
    pub id: u64,
    /// Seconds left.
    #[serde(default)]
    pub remain: u32,
    /// Seconds the timer was armed with.
    #[serde(default)]
    pub total: u32,
    /// `"on"` or `"off"`.
    #[serde(default)]
    pub action: Option<String>,
}

/// Payload of a successful `addTimer` / `addTimerV2`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerCreated {
    /// Id of the new timer.
    pub id: u64,
}
