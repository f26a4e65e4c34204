// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::response::Outcome;
use crate::types::{AirQuality, AutoPreference, Connectivity, NightLight, PowerStatus};

use super::state_change::UNRECOGNIZED_MODE_KEY;
use super::{StateChange, Timer};

/// Last known state of a device.
///
/// Created with safe defaults (off, empty mode, level 0, offline), filled by
/// the first successful detail fetch, and mutated thereafter only through
/// [`DeviceState::apply`]. Family-specific readings are `None` until the
/// device reports them.
///
/// # Examples
///
/// ```
/// use vesync_lib::state::{DeviceState, StateChange};
/// use vesync_lib::types::PowerStatus;
///
/// let mut state = DeviceState::new();
/// assert_eq!(state.mode(), "");
///
/// state.apply(&StateChange::Batch(vec![
///     StateChange::Power(PowerStatus::On),
///     StateChange::Mode("manual".into()),
///     StateChange::Level(2),
/// ]));
/// assert!(state.power().is_on());
/// assert_eq!(state.level(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    power: PowerStatus,
    mode: String,
    level: u8,
    display_on: bool,
    child_lock_on: bool,
    connectivity: Connectivity,
    timer: Option<Timer>,
    air_quality: Option<AirQuality>,
    pm25: Option<u16>,
    filter_life: Option<u8>,
    humidity: Option<u8>,
    target_humidity: Option<u8>,
    water_lacks: bool,
    warm_mist_level: Option<u8>,
    night_light: Option<NightLight>,
    night_light_brightness: Option<u8>,
    oscillation: bool,
    light_detection: bool,
    auto_preference: Option<AutoPreference>,
    extra: Map<String, Value>,
}

impl DeviceState {
    /// Creates a state with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Common fields ==========

    /// Returns the power status.
    #[must_use]
    pub fn power(&self) -> PowerStatus {
        self.power
    }

    /// Returns the operating mode, empty before the first detail fetch.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Returns the fan or mist level; `0` when no level is active.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns `true` if the display is on.
    #[must_use]
    pub fn display_on(&self) -> bool {
        self.display_on
    }

    /// Returns `true` if the child lock is engaged.
    #[must_use]
    pub fn child_lock_on(&self) -> bool {
        self.child_lock_on
    }

    /// Returns the cloud connectivity.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Returns the tracked timer.
    #[must_use]
    pub fn timer(&self) -> Option<&Timer> {
        self.timer.as_ref()
    }

    // ========== Family-specific readings ==========

    /// Returns the air quality index.
    #[must_use]
    pub fn air_quality(&self) -> Option<AirQuality> {
        self.air_quality
    }

    /// Returns the PM2.5 concentration in µg/m³.
    #[must_use]
    pub fn pm25(&self) -> Option<u16> {
        self.pm25
    }

    /// Returns the remaining filter life in percent.
    #[must_use]
    pub fn filter_life(&self) -> Option<u8> {
        self.filter_life
    }

    /// Returns the measured humidity in percent.
    #[must_use]
    pub fn humidity(&self) -> Option<u8> {
        self.humidity
    }

    /// Returns the target humidity in percent.
    #[must_use]
    pub fn target_humidity(&self) -> Option<u8> {
        self.target_humidity
    }

    /// Returns `true` if the water tank is empty.
    #[must_use]
    pub fn water_lacks(&self) -> bool {
        self.water_lacks
    }

    /// Returns the warm mist level.
    #[must_use]
    pub fn warm_mist_level(&self) -> Option<u8> {
        self.warm_mist_level
    }

    /// Returns the night light setting.
    #[must_use]
    pub fn night_light(&self) -> Option<NightLight> {
        self.night_light
    }

    /// Returns the night light brightness in percent.
    #[must_use]
    pub fn night_light_brightness(&self) -> Option<u8> {
        self.night_light_brightness
    }

    /// Returns `true` if oscillation is on.
    #[must_use]
    pub fn oscillation(&self) -> bool {
        self.oscillation
    }

    /// Returns `true` if light detection is on.
    #[must_use]
    pub fn light_detection(&self) -> bool {
        self.light_detection
    }

    /// Returns the auto-mode preference.
    #[must_use]
    pub fn auto_preference(&self) -> Option<&AutoPreference> {
        self.auto_preference.as_ref()
    }

    /// Returns the response fields no schema claimed on the last fetch.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    // ========== Updates ==========

    /// Applies a state change.
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Power(power) => replace(&mut self.power, *power),
            StateChange::Mode(mode) => {
                if self.mode == *mode {
                    false
                } else {
                    mode.clone_into(&mut self.mode);
                    true
                }
            }
            StateChange::Level(level) => replace(&mut self.level, *level),
            StateChange::Display(on) => replace(&mut self.display_on, *on),
            StateChange::ChildLock(on) => replace(&mut self.child_lock_on, *on),
            StateChange::Connectivity(c) => replace(&mut self.connectivity, *c),
            StateChange::Timer(timer) => replace(&mut self.timer, timer.clone()),
            StateChange::AirQuality { level, pm25 } => {
                let mut changed = false;
                if let Some(level) = level {
                    changed |= replace(&mut self.air_quality, Some(*level));
                }
                if let Some(pm25) = pm25 {
                    changed |= replace(&mut self.pm25, Some(*pm25));
                }
                changed
            }
            StateChange::FilterLife(v) => replace(&mut self.filter_life, Some(*v)),
            StateChange::Humidity(v) => replace(&mut self.humidity, Some(*v)),
            StateChange::TargetHumidity(v) => replace(&mut self.target_humidity, Some(*v)),
            StateChange::WaterLacks(v) => replace(&mut self.water_lacks, *v),
            StateChange::WarmMistLevel(v) => replace(&mut self.warm_mist_level, Some(*v)),
            StateChange::NightLight(v) => replace(&mut self.night_light, Some(*v)),
            StateChange::NightLightBrightness(v) => {
                replace(&mut self.night_light_brightness, Some(*v))
            }
            StateChange::Oscillation(v) => replace(&mut self.oscillation, *v),
            StateChange::LightDetection(v) => replace(&mut self.light_detection, *v),
            StateChange::AutoPreference(v) => {
                replace(&mut self.auto_preference, Some(v.clone()))
            }
            StateChange::Extra(extra) => replace(&mut self.extra, extra.clone()),
            StateChange::UnrecognizedMode(mode) => {
                let value = Value::String(mode.clone());
                self.extra.insert(UNRECOGNIZED_MODE_KEY.to_string(), value.clone())
                    != Some(value)
            }
            StateChange::Batch(changes) => {
                let mut changed = false;
                for change in changes {
                    changed |= self.apply(change);
                }
                changed
            }
        }
    }

    /// Applies a change only if `outcome` classified the call as a success.
    ///
    /// A failed outcome leaves every field untouched and returns `false`.
    pub fn apply_optimistic(&mut self, outcome: &Outcome, change: &StateChange) -> bool {
        if !outcome.success {
            return false;
        }
        self.apply(change)
    }
}

fn replace<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}
