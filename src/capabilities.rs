// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capability profiles.
//!
//! A [`CapabilityProfile`] describes what a device type supports: which
//! request/response envelope it speaks ([`Variant`]), which optional
//! features it has ([`FeatureTag`]), and which levels, modes and auto
//! preferences are valid arguments.
//!
//! Profiles for known device types live in the read-only
//! [`registry`](crate::registry). Custom profiles can be assembled with
//! [`ProfileBuilder`], for devices the registry does not know yet.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Request/response envelope shape spoken by a device generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Per-operation REST endpoints, flat body with a single `code`.
    LegacyFlat,
    /// `bypass` endpoint, request wrapped in `jsonCmd`, nested result codes.
    BypassV1,
    /// `bypassV2` endpoint, request wrapped in `payload`, nested result codes.
    BypassV2,
    /// `bypassV2` with camelCase fields and unreliable inner result codes.
    VitalQuirk,
}

impl Variant {
    /// Returns `true` for variants wrapping results in `result.code`.
    #[must_use]
    pub const fn is_bypass(self) -> bool {
        !matches!(self, Self::LegacyFlat)
    }

    /// Returns `true` if commands on this variant converge asynchronously.
    #[must_use]
    pub const fn needs_reconciliation(self) -> bool {
        matches!(self, Self::VitalQuirk)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LegacyFlat => "legacy-flat",
            Self::BypassV1 => "bypass-v1",
            Self::BypassV2 => "bypass-v2",
            Self::VitalQuirk => "vital-quirk",
        };
        f.write_str(name)
    }
}

/// Product family of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Air purifiers.
    AirPurifier,
    /// Humidifiers.
    Humidifier,
    /// Tower and pedestal fans.
    Fan,
    /// Device type missing from the registry.
    Unknown,
}

impl Family {
    /// Returns `true` if mode changes drive the visible fan level.
    ///
    /// Humidifiers keep their mist level across mode changes.
    #[must_use]
    pub const fn has_mode_driven_level(self) -> bool {
        matches!(self, Self::AirPurifier | Self::Fan)
    }
}

/// Optional feature gating a group of operations and state fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTag {
    /// Air quality index and PM2.5 readings.
    AirQuality,
    /// Filter life percentage.
    FilterLife,
    /// Display on/off.
    Display,
    /// Child lock.
    ChildLock,
    /// Auto-off/on timer.
    Timer,
    /// Night light with on/off/dim levels.
    NightLight,
    /// Night light with a 0-100 brightness.
    NightLightBrightness,
    /// Auto mode preference (default/efficient/quiet).
    AutoPreference,
    /// Ambient light detection.
    LightDetection,
    /// Oscillation.
    Oscillation,
    /// Relative humidity reading.
    Humidity,
    /// Target humidity setting.
    TargetHumidity,
    /// Warm mist level.
    WarmMist,
}

impl FeatureTag {
    /// Returns the snake_case name of this feature.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality",
            Self::FilterLife => "filter_life",
            Self::Display => "display",
            Self::ChildLock => "child_lock",
            Self::Timer => "timer",
            Self::NightLight => "night_light",
            Self::NightLightBrightness => "night_light_brightness",
            Self::AutoPreference => "auto_preference",
            Self::LightDetection => "light_detection",
            Self::Oscillation => "oscillation",
            Self::Humidity => "humidity",
            Self::TargetHumidity => "target_humidity",
            Self::WarmMist => "warm_mist",
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of what a device type supports.
///
/// # Examples
///
/// ```
/// use vesync_lib::{CapabilityProfile, FeatureTag, ProfileBuilder, Variant, Family};
///
/// let profile = ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
///     .model("Core300S")
///     .levels([1, 2, 3])
///     .modes(["auto", "manual", "sleep"])
///     .with_feature(FeatureTag::Display)
///     .build();
///
/// assert!(profile.supports_level(2));
/// assert!(!profile.supports_level(4));
/// assert!(profile.has_feature(FeatureTag::Display));
/// assert!(!profile.has_feature(FeatureTag::ChildLock));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Marketing model name, e.g. `Core300S`.
    pub model: String,
    /// Envelope variant.
    pub variant: Variant,
    /// Product family.
    pub family: Family,
    /// Supported optional features.
    pub features: BTreeSet<FeatureTag>,
    /// Valid control levels, ascending.
    pub levels: Vec<u8>,
    /// Valid modes, in vendor order.
    pub modes: Vec<String>,
    /// Valid auto preference types.
    pub auto_preferences: Vec<String>,
    /// Valid warm mist levels, ascending (humidifiers only).
    pub warm_levels: Vec<u8>,
    /// Requests for `auto` are sent as `manual`.
    ///
    /// Only the Core200S purifier carries this: its app exposes an auto
    /// button that the hardware does not implement.
    pub redirect_auto_to_manual: bool,
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self {
            model: String::from("unknown"),
            variant: Variant::BypassV2,
            family: Family::Unknown,
            features: BTreeSet::new(),
            levels: Vec::new(),
            modes: Vec::new(),
            auto_preferences: Vec::new(),
            warm_levels: Vec::new(),
            redirect_auto_to_manual: false,
        }
    }
}

impl CapabilityProfile {
    /// Returns whether the feature is part of this profile.
    #[must_use]
    pub fn has_feature(&self, tag: FeatureTag) -> bool {
        self.features.contains(&tag)
    }

    /// Returns whether `level` is a valid control level.
    #[must_use]
    pub fn supports_level(&self, level: u8) -> bool {
        self.levels.contains(&level)
    }

    /// Returns whether `mode` is a valid mode.
    #[must_use]
    pub fn supports_mode(&self, mode: &str) -> bool {
        self.modes.iter().any(|m| m == mode)
    }

    /// Returns whether `preference` is a valid auto preference.
    #[must_use]
    pub fn supports_auto_preference(&self, preference: &str) -> bool {
        self.auto_preferences.iter().any(|p| p == preference)
    }

    /// Returns the lowest control level, if any.
    #[must_use]
    pub fn min_level(&self) -> Option<u8> {
        self.levels.first().copied()
    }

    /// Returns the highest control level, if any.
    #[must_use]
    pub fn max_level(&self) -> Option<u8> {
        self.levels.last().copied()
    }

    /// Returns `true` for the empty fallback profile.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.family == Family::Unknown
    }
}

/// Builder for custom capability profiles.
#[derive(Debug)]
pub struct ProfileBuilder {
    inner: CapabilityProfile,
}

impl ProfileBuilder {
    /// Creates a builder with an empty feature set.
    #[must_use]
    pub fn new(variant: Variant, family: Family) -> Self {
        Self {
            inner: CapabilityProfile {
                variant,
                family,
                ..CapabilityProfile::default()
            },
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.inner.model = model.into();
        self
    }

    /// Sets the control levels. Duplicates are removed and levels sorted.
    #[must_use]
    pub fn levels(mut self, levels: impl IntoIterator<Item = u8>) -> Self {
        self.inner.levels = sorted_unique(levels);
        self
    }

    /// Sets the control levels to `1..=max`.
    #[must_use]
    pub fn levels_up_to(self, max: u8) -> Self {
        self.levels(1..=max)
    }

    /// Sets the modes. Order is kept; duplicates are dropped.
    #[must_use]
    pub fn modes<S: Into<String>>(mut self, modes: impl IntoIterator<Item = S>) -> Self {
        self.inner.modes = ordered_unique(modes);
        self
    }

    /// Sets the auto preferences and enables [`FeatureTag::AutoPreference`].
    #[must_use]
    pub fn auto_preferences<S: Into<String>>(
        mut self,
        preferences: impl IntoIterator<Item = S>,
    ) -> Self {
        self.inner.auto_preferences = ordered_unique(preferences);
        self.inner.features.insert(FeatureTag::AutoPreference);
        self
    }

    /// Sets the warm mist levels and enables [`FeatureTag::WarmMist`].
    #[must_use]
    pub fn warm_levels(mut self, levels: impl IntoIterator<Item = u8>) -> Self {
        self.inner.warm_levels = sorted_unique(levels);
        self.inner.features.insert(FeatureTag::WarmMist);
        self
    }

    /// Enables a feature.
    #[must_use]
    pub fn with_feature(mut self, tag: FeatureTag) -> Self {
        self.inner.features.insert(tag);
        self
    }

    /// Enables several features.
    #[must_use]
    pub fn with_features(mut self, tags: impl IntoIterator<Item = FeatureTag>) -> Self {
        self.inner.features.extend(tags);
        self
    }

    /// Sends `auto` requests as `manual`.
    #[must_use]
    pub fn redirect_auto_to_manual(mut self) -> Self {
        self.inner.redirect_auto_to_manual = true;
        self
    }

    /// Builds the profile.
    #[must_use]
    pub fn build(self) -> CapabilityProfile {
        self.inner
    }
}

fn sorted_unique(levels: impl IntoIterator<Item = u8>) -> Vec<u8> {
    levels
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn ordered_unique<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
