// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! Protocol adapters never touch a [`DeviceState`](super::DeviceState)
//! directly. They turn a classified response into a [`StateChange`], which
//! the device normalizes against its capability profile and then applies
//! in one step.
//!
//! # Examples
//!
//! ```
//! use vesync_lib::state::{DeviceState, StateChange};
//! use vesync_lib::types::PowerStatus;
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::Power(PowerStatus::On)));
//! assert!(!state.apply(&StateChange::Power(PowerStatus::On)));
//! ```

use serde_json::{Map, Value};

use crate::capabilities::{CapabilityProfile, FeatureTag};
use crate::types::{AirQuality, AutoPreference, Connectivity, NightLight, PowerStatus};

use super::Timer;

/// Key under which a reported mode missing from the profile is kept.
pub const UNRECOGNIZED_MODE_KEY: &str = "unrecognized_mode";

/// A change to one or more [`DeviceState`](super::DeviceState) fields.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Power status changed.
    Power(PowerStatus),

    /// Operating mode changed.
    Mode(String),

    /// Fan or mist level changed. `0` means no active level.
    Level(u8),

    /// Display switched on or off.
    Display(bool),

    /// Child lock engaged or released.
    ChildLock(bool),

    /// Cloud connectivity changed.
    Connectivity(Connectivity),

    /// Timer armed, re-synchronized, or cleared (`None`).
    Timer(Option<Timer>),

    /// Air quality sensor reading.
    AirQuality {
        /// Quality index.
        level: Option<AirQuality>,
        /// PM2.5 concentration in µg/m³.
        pm25: Option<u16>,
    },

    /// Remaining filter life in percent.
    FilterLife(u8),

    /// Measured relative humidity in percent.
    Humidity(u8),

    /// Target humidity in percent.
    TargetHumidity(u8),

    /// Water tank empty flag.
    WaterLacks(bool),

    /// Warm mist level (`0` = warm mist off).
    WarmMistLevel(u8),

    /// Three-step night light setting.
    NightLight(NightLight),

    /// Night light brightness in percent.
    NightLightBrightness(u8),

    /// Oscillation switched on or off.
    Oscillation(bool),

    /// Light detection switched on or off.
    LightDetection(bool),

    /// Auto-mode preference changed.
    AutoPreference(AutoPreference),

    /// Replaces the bucket of response fields no schema claimed.
    Extra(Map<String, Value>),

    /// A reported mode missing from the profile, kept aside in `extra`.
    UnrecognizedMode(String),

    /// Multiple changes applied together, in order.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Returns the feature gating this change, if any.
    ///
    /// Power, mode, level, display, connectivity and the unknown-field
    /// bucket are common to every device and are never gated.
    #[must_use]
    pub fn feature(&self) -> Option<FeatureTag> {
        match self {
            Self::ChildLock(_) => Some(FeatureTag::ChildLock),
            Self::Timer(_) => Some(FeatureTag::Timer),
            Self::AirQuality { .. } => Some(FeatureTag::AirQuality),
            Self::FilterLife(_) => Some(FeatureTag::FilterLife),
            Self::Humidity(_) | Self::WaterLacks(_) => Some(FeatureTag::Humidity),
            Self::TargetHumidity(_) => Some(FeatureTag::TargetHumidity),
            Self::WarmMistLevel(_) => Some(FeatureTag::WarmMist),
            Self::NightLight(_) => Some(FeatureTag::NightLight),
            Self::NightLightBrightness(_) => Some(FeatureTag::NightLightBrightness),
            Self::Oscillation(_) => Some(FeatureTag::Oscillation),
            Self::LightDetection(_) => Some(FeatureTag::LightDetection),
            Self::AutoPreference(_) => Some(FeatureTag::AutoPreference),
            Self::Power(_)
            | Self::Mode(_)
            | Self::Level(_)
            | Self::Display(_)
            | Self::Connectivity(_)
            | Self::Extra(_)
            | Self::UnrecognizedMode(_)
            | Self::Batch(_) => None,
        }
    }

    /// Brings a change in line with the device's capability profile.
    ///
    /// - changes to fields the profile does not gate in are dropped
    /// - a level outside the profile becomes `0`
    /// - a mode outside the profile is diverted to the `extra` bucket
    /// - a warm mist level outside the profile is dropped
    ///
    /// Returns `None` if nothing is left to apply.
    #[must_use]
    pub fn normalize(self, profile: &CapabilityProfile) -> Option<Self> {
        if let Some(tag) = self.feature()
            && !profile.has_feature(tag)
        {
            return None;
        }

        match self {
            Self::Level(level) if level != 0 && !profile.supports_level(level) => {
                Some(Self::Level(0))
            }
            Self::Mode(mode) if !profile.supports_mode(&mode) => {
                Some(Self::UnrecognizedMode(mode))
            }
            Self::WarmMistLevel(level) if !profile.warm_levels.contains(&level) => None,
            Self::Batch(changes) => {
                let changes: Vec<_> = changes
                    .into_iter()
                    .filter_map(|change| change.normalize(profile))
                    .collect();
                (!changes.is_empty()).then_some(Self::Batch(changes))
            }
            other => Some(other),
        }
    }
}
