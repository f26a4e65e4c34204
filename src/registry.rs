// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only capability registry.
//!
//! Maps a vendor device type identifier (model SKU such as
//! `LAP-C401S-WUSR`) to its [`CapabilityProfile`]. The table is built once
//! on first access and never changes afterwards.
//!
//! Entries must stay in lock-step with the adapters in
//! [`command`](crate::command): a mode or level missing here silently
//! disables the operation instead of failing at runtime.
//!
//! # Examples
//!
//! ```
//! use vesync_lib::registry;
//! use vesync_lib::{FeatureTag, Variant};
//!
//! let profile = registry::lookup("LAP-V201S-WUS");
//! assert_eq!(profile.model, "Vital200S");
//! assert_eq!(profile.variant, Variant::VitalQuirk);
//! assert!(profile.has_feature(FeatureTag::LightDetection));
//!
//! // Unknown identifiers fall back to an empty profile.
//! let unknown = registry::lookup("XYZ-123");
//! assert!(unknown.features.is_empty());
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::capabilities::{CapabilityProfile, Family, FeatureTag, ProfileBuilder, Variant};

/// One registry entry: a model and all the device type ids it ships under.
#[derive(Debug)]
pub struct ModelEntry {
    /// Device type identifiers reported by the vendor listing.
    pub device_types: &'static [&'static str],
    /// The shared profile.
    pub profile: CapabilityProfile,
}

struct Registry {
    models: Vec<ModelEntry>,
    index: HashMap<&'static str, usize>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let models = catalog();
    let mut index = HashMap::new();
    for (i, entry) in models.iter().enumerate() {
        for device_type in entry.device_types {
            index.insert(*device_type, i);
        }
    }
    Registry { models, index }
});

static FALLBACK: LazyLock<CapabilityProfile> = LazyLock::new(CapabilityProfile::default);

/// Looks up the profile for a device type.
///
/// Matching is exact. Unknown identifiers return the empty fallback
/// profile, which narrows what operations succeed but never fails.
#[must_use]
pub fn lookup(device_type: &str) -> &'static CapabilityProfile {
    REGISTRY
        .index
        .get(device_type)
        .map_or(&*FALLBACK, |&i| &REGISTRY.models[i].profile)
}

/// Returns `true` if the device type has a registry entry.
#[must_use]
pub fn is_known(device_type: &str) -> bool {
    REGISTRY.index.contains_key(device_type)
}

/// Returns every model entry.
pub fn models() -> impl Iterator<Item = &'static ModelEntry> {
    REGISTRY.models.iter()
}

/// Returns every known device type identifier.
pub fn device_types() -> impl Iterator<Item = &'static str> {
    REGISTRY
        .models
        .iter()
        .flat_map(|entry| entry.device_types.iter().copied())
}

const CORE_FEATURES: [FeatureTag; 4] = [
    FeatureTag::Display,
    FeatureTag::ChildLock,
    FeatureTag::Timer,
    FeatureTag::FilterLife,
];

const VITAL_FEATURES: [FeatureTag; 7] = [
    FeatureTag::AirQuality,
    FeatureTag::FilterLife,
    FeatureTag::Display,
    FeatureTag::ChildLock,
    FeatureTag::Timer,
    FeatureTag::LightDetection,
    FeatureTag::AutoPreference,
];

const AUTO_PREFERENCES: [&str; 3] = ["default", "efficient", "quiet"];

#[allow(clippy::too_many_lines)]
fn catalog() -> Vec<ModelEntry> {
    vec![
        // ---------------------------------------------------------------
        // Air purifiers
        // ---------------------------------------------------------------
        ModelEntry {
            device_types: &["LV-PUR131S", "LV-RH131S"],
            profile: ProfileBuilder::new(Variant::LegacyFlat, Family::AirPurifier)
                .model("LV-PUR131S")
                .levels_up_to(3)
                .modes(["auto", "manual", "sleep"])
                .with_features([
                    FeatureTag::AirQuality,
                    FeatureTag::FilterLife,
                    FeatureTag::Display,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &["Core200S", "LAP-C201S-AUSR", "LAP-C202S-WUSR"],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
                .model("Core200S")
                .levels_up_to(3)
                .modes(["manual", "sleep"])
                .with_features(CORE_FEATURES)
                .with_feature(FeatureTag::NightLight)
                .redirect_auto_to_manual()
                .build(),
        },
        ModelEntry {
            device_types: &[
                "Core300S",
                "LAP-C301S-WJP",
                "LAP-C302S-WUSB",
                "LAP-C301S-WAAA",
            ],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
                .model("Core300S")
                .levels_up_to(3)
                .modes(["auto", "manual", "sleep"])
                .with_features(CORE_FEATURES)
                .with_feature(FeatureTag::AirQuality)
                .build(),
        },
        ModelEntry {
            device_types: &[
                "Core400S",
                "LAP-C401S-WJP",
                "LAP-C401S-WUSR",
                "LAP-C401S-WAAA",
            ],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
                .model("Core400S")
                .levels_up_to(4)
                .modes(["auto", "manual", "sleep"])
                .with_features(CORE_FEATURES)
                .with_feature(FeatureTag::AirQuality)
                .build(),
        },
        ModelEntry {
            device_types: &[
                "Core600S",
                "LAP-C601S-WUS",
                "LAP-C601S-WUSR",
                "LAP-C601S-WEU",
            ],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
                .model("Core600S")
                .levels_up_to(4)
                .modes(["auto", "manual", "sleep"])
                .with_features(CORE_FEATURES)
                .with_feature(FeatureTag::AirQuality)
                .build(),
        },
        ModelEntry {
            device_types: &[
                "LAP-V102S-AASR",
                "LAP-V102S-WUS",
                "LAP-V102S-WEU",
                "LAP-V102S-AUSR",
                "LAP-V102S-WJP",
            ],
            profile: ProfileBuilder::new(Variant::VitalQuirk, Family::AirPurifier)
                .model("Vital100S")
                .levels_up_to(4)
                .modes(["manual", "auto", "sleep"])
                .with_features(VITAL_FEATURES)
                .auto_preferences(AUTO_PREFERENCES)
                .build(),
        },
        ModelEntry {
            device_types: &[
                "LAP-V201S-AASR",
                "LAP-V201S-WJP",
                "LAP-V201S-WEU",
                "LAP-V201S-WUS",
                "LAP-V201-AUSR",
                "LAP-V201S-AUSR",
            ],
            profile: ProfileBuilder::new(Variant::VitalQuirk, Family::AirPurifier)
                .model("Vital200S")
                .levels_up_to(4)
                .modes(["manual", "auto", "sleep", "pet"])
                .with_features(VITAL_FEATURES)
                .auto_preferences(AUTO_PREFERENCES)
                .build(),
        },
        ModelEntry {
            device_types: &[
                "LAP-EL551S-AUS",
                "LAP-EL551S-AEUR",
                "LAP-EL551S-WEU",
                "LAP-EL551S-WUS",
            ],
            profile: ProfileBuilder::new(Variant::VitalQuirk, Family::AirPurifier)
                .model("EverestAir")
                .levels_up_to(3)
                .modes(["auto", "manual", "sleep", "turbo"])
                .with_features(VITAL_FEATURES)
                .auto_preferences(AUTO_PREFERENCES)
                .build(),
        },
        // ---------------------------------------------------------------
        // Humidifiers
        // ---------------------------------------------------------------
        ModelEntry {
            device_types: &["Classic300S", "LUH-A601S-WUSB", "LUH-A601S-AUSW"],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::Humidifier)
                .model("Classic300S")
                .levels_up_to(9)
                .modes(["auto", "sleep", "manual"])
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                    FeatureTag::NightLightBrightness,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &["Classic200S"],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::Humidifier)
                .model("Classic200S")
                .levels_up_to(9)
                .modes(["auto", "manual"])
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &[
                "Dual200S",
                "LUH-D301S-WUSR",
                "LUH-D301S-WJP",
                "LUH-D301S-WEU",
            ],
            profile: ProfileBuilder::new(Variant::BypassV1, Family::Humidifier)
                .model("Dual200S")
                .levels_up_to(2)
                .modes(["auto", "manual"])
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &[
                "LUH-A602S-WUSR",
                "LUH-A602S-WUS",
                "LUH-A602S-WEUR",
                "LUH-A602S-WEU",
                "LUH-A602S-WJP",
            ],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::Humidifier)
                .model("LV600S")
                .levels_up_to(9)
                .modes(["auto", "sleep", "manual", "humidity"])
                .warm_levels(0..=3)
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &["LUH-O451S-WUS", "LUH-O451S-WUSR", "LUH-O451S-WEU"],
            profile: ProfileBuilder::new(Variant::BypassV2, Family::Humidifier)
                .model("OasisMist450S")
                .levels_up_to(9)
                .modes(["auto", "sleep", "manual", "humidity"])
                .warm_levels(0..=3)
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                ])
                .build(),
        },
        ModelEntry {
            device_types: &["LEH-S601S-WUS", "LEH-S601S-WUSR"],
            profile: ProfileBuilder::new(Variant::VitalQuirk, Family::Humidifier)
                .model("Superior6000S")
                .levels_up_to(9)
                .modes(["auto", "manual", "sleep"])
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::ChildLock,
                    FeatureTag::Timer,
                    FeatureTag::Humidity,
                    FeatureTag::TargetHumidity,
                ])
                .build(),
        },
        // ---------------------------------------------------------------
        // Fans
        // ---------------------------------------------------------------
        ModelEntry {
            device_types: &[
                "LTF-F422S-KEU",
                "LTF-F422S-WUSR",
                "LTF-F422S-WJP",
                "LTF-F422S-WUS",
            ],
            profile: ProfileBuilder::new(Variant::VitalQuirk, Family::Fan)
                .model("TowerFan")
                .levels_up_to(12)
                .modes(["normal", "turbo", "auto", "advancedSleep"])
                .with_features([
                    FeatureTag::Display,
                    FeatureTag::Timer,
                    FeatureTag::Oscillation,
                ])
                .build(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup("Core400S").model, "Core400S");
        assert_eq!(lookup("LAP-C401S-WUSR").model, "Core400S");
        assert!(lookup("core400s").is_fallback());
        assert!(lookup("LAP-C401S").is_fallback());
    }

    #[test]
    fn unknown_type_falls_back_to_empty_profile() {
        let profile = lookup("does-not-exist");
        assert!(profile.features.is_empty());
        assert!(profile.levels.is_empty());
        assert!(profile.modes.is_empty());
        assert!(!is_known("does-not-exist"));
    }

    #[test]
    fn device_types_are_unique() {
        let mut seen = HashSet::new();
        for device_type in device_types() {
            assert!(seen.insert(device_type), "duplicate entry {device_type}");
        }
    }

    #[test]
    fn every_model_has_levels_and_modes() {
        for entry in models() {
            let profile = &entry.profile;
            assert!(!profile.levels.is_empty(), "{} has no levels", profile.model);
            assert!(!profile.modes.is_empty(), "{} has no modes", profile.model);
            assert!(
                !profile.levels.contains(&0),
                "{} lists 0 as a control level",
                profile.model
            );
        }
    }

    #[test]
    fn auto_preference_feature_matches_list() {
        for entry in models() {
            let profile = &entry.profile;
            assert_eq!(
                profile.has_feature(FeatureTag::AutoPreference),
                !profile.auto_preferences.is_empty(),
                "{}",
                profile.model
            );
        }
    }

    #[test]
    fn warm_mist_feature_matches_list() {
        for entry in models() {
            let profile = &entry.profile;
            assert_eq!(
                profile.has_feature(FeatureTag::WarmMist),
                !profile.warm_levels.is_empty(),
                "{}",
                profile.model
            );
        }
    }

    #[test]
    fn only_core200s_redirects_auto() {
        let redirecting: Vec<_> = models()
            .filter(|e| e.profile.redirect_auto_to_manual)
            .map(|e| e.profile.model.as_str())
            .collect();
        assert_eq!(redirecting, vec!["Core200S"]);
        assert!(!lookup("Core200S").supports_mode("auto"));
    }

    #[test]
    fn level_driven_families_list_manual_or_normal() {
        for entry in models() {
            let profile = &entry.profile;
            if profile.family.has_mode_driven_level() {
                assert!(
                    profile.supports_mode("manual") || profile.supports_mode("normal"),
                    "{} has no manual mode",
                    profile.model
                );
            }
        }
    }

    #[test]
    fn vital_profiles() {
        let vital = lookup("LAP-V102S-WUS");
        assert_eq!(vital.variant, Variant::VitalQuirk);
        assert_eq!(vital.levels, vec![1, 2, 3, 4]);
        assert!(!vital.supports_mode("pet"));
        assert!(lookup("LAP-V201S-WUS").supports_mode("pet"));
        assert!(lookup("LAP-EL551S-WUS").supports_mode("turbo"));
    }

    #[test]
    fn legacy_profile() {
        let profile = lookup("LV-PUR131S");
        assert_eq!(profile.variant, Variant::LegacyFlat);
        assert!(!profile.has_feature(FeatureTag::ChildLock));
        assert!(!profile.has_feature(FeatureTag::Timer));
    }
}
