// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variant protocol adapters.
//!
//! A device never builds vendor JSON itself. It describes what it wants as
//! an [`Operation`] and hands it to the [`ProtocolAdapter`] fixed by its
//! capability profile, which knows the request shape and how to turn the
//! response into a [`StateChange`].
//!
//! | Variant | Endpoint | Body |
//! |---------|----------|------|
//! | legacy-flat | `/131airPurifier/v1/device/*` | flat, one path per operation |
//! | bypass-v1 | `/cloud/v1/deviceManaged/bypass` | `jsonCmd {method, data}` |
//! | bypass-v2 | `/cloud/v2/deviceManaged/bypassV2` | `payload {method, source, data}` |
//! | vital-quirk | `/cloud/v2/deviceManaged/bypassV2` | as bypass-v2, camelCase data |
//!
//! # Examples
//!
//! ```
//! use vesync_lib::command::{AdapterContext, Operation, ProtocolAdapter};
//! use vesync_lib::device::DeviceInfo;
//! use vesync_lib::protocol::Session;
//! use vesync_lib::registry;
//! use vesync_lib::state::DeviceState;
//! use vesync_lib::types::PowerStatus;
//!
//! let info = DeviceInfo::new("cid-1", "Core300S");
//! let session = Session::new("1", "tk");
//! let state = DeviceState::new();
//! let profile = registry::lookup("Core300S");
//! let ctx = AdapterContext::new(&info, &session, profile, &state);
//!
//! let adapter = ProtocolAdapter::new(profile.variant);
//! let request = adapter.prepare(&ctx, &Operation::Power(PowerStatus::On)).unwrap();
//! assert_eq!(request.bypass_method(), Some("setSwitch"));
//! assert_eq!(request.body["payload"]["data"]["enabled"], true);
//! ```

mod bypass;
mod legacy;
mod vital;

use std::fmt;

use serde_json::Value;

use crate::capabilities::{CapabilityProfile, Family, FeatureTag, Variant};
use crate::device::DeviceInfo;
use crate::error::{DeviceError, ParseError};
use crate::protocol::{ApiRequest, Session};
use crate::response::Access;
use crate::state::{DeviceState, StateChange, Timer};
use crate::types::{AutoPreference, Brightness, NightLight, PowerStatus, TargetHumidity, TimerAction};

/// A logical operation on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Fetch the full device status.
    Details,
    /// Switch power.
    Power(PowerStatus),
    /// Change operating mode.
    Mode(String),
    /// Change fan or mist level.
    Level(u8),
    /// Switch the display.
    Display(bool),
    /// Engage or release the child lock.
    ChildLock(bool),
    /// Arm a timer.
    SetTimer {
        /// Countdown in seconds.
        seconds: u32,
        /// Action on expiry.
        action: TimerAction,
    },
    /// Cancel a timer.
    ClearTimer {
        /// Vendor timer id.
        id: u64,
    },
    /// Fetch the armed timer.
    GetTimer,
    /// Set the three-step night light.
    NightLight(NightLight),
    /// Set the night light brightness.
    NightLightBrightness(Brightness),
    /// Switch oscillation.
    Oscillation(bool),
    /// Set the auto-mode preference.
    AutoPreference(AutoPreference),
    /// Switch light detection.
    LightDetection(bool),
    /// Set the target humidity.
    TargetHumidity(TargetHumidity),
    /// Set the warm mist level.
    WarmMistLevel(u8),
}

impl Operation {
    /// Returns a short name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Power(_) => "power",
            Self::Mode(_) => "mode",
            Self::Level(_) => "level",
            Self::Display(_) => "display",
            Self::ChildLock(_) => "child_lock",
            Self::SetTimer { .. } => "set_timer",
            Self::ClearTimer { .. } => "clear_timer",
            Self::GetTimer => "get_timer",
            Self::NightLight(_) => "night_light",
            Self::NightLightBrightness(_) => "night_light_brightness",
            Self::Oscillation(_) => "oscillation",
            Self::AutoPreference(_) => "auto_preference",
            Self::LightDetection(_) => "light_detection",
            Self::TargetHumidity(_) => "target_humidity",
            Self::WarmMistLevel(_) => "warm_mist_level",
        }
    }

    /// Returns the feature gating this operation, if any.
    #[must_use]
    pub const fn feature(&self) -> Option<FeatureTag> {
        match self {
            Self::Details | Self::Power(_) | Self::Mode(_) | Self::Level(_) => None,
            Self::Display(_) => Some(FeatureTag::Display),
            Self::ChildLock(_) => Some(FeatureTag::ChildLock),
            Self::SetTimer { .. } | Self::ClearTimer { .. } | Self::GetTimer => {
                Some(FeatureTag::Timer)
            }
            Self::NightLight(_) => Some(FeatureTag::NightLight),
            Self::NightLightBrightness(_) => Some(FeatureTag::NightLightBrightness),
            Self::Oscillation(_) => Some(FeatureTag::Oscillation),
            Self::AutoPreference(_) => Some(FeatureTag::AutoPreference),
            Self::LightDetection(_) => Some(FeatureTag::LightDetection),
            Self::TargetHumidity(_) => Some(FeatureTag::TargetHumidity),
            Self::WarmMistLevel(_) => Some(FeatureTag::WarmMist),
        }
    }

    /// Returns `true` for operations that only read state.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Details | Self::GetTimer)
    }

    /// Returns `true` if a vital-quirk write may succeed on a clean outer
    /// layer regardless of the inner code.
    ///
    /// Limited to power, mode and level; every other write is strict.
    #[must_use]
    pub const fn tolerates_inner_code(&self, variant: Variant) -> bool {
        matches!(variant, Variant::VitalQuirk)
            && matches!(self, Self::Power(_) | Self::Mode(_) | Self::Level(_))
    }

    /// Returns how strictly the response to this operation is classified.
    #[must_use]
    pub const fn access(&self, variant: Variant) -> Access {
        if self.is_read() {
            Access::Read
        } else if self.tolerates_inner_code(variant) {
            Access::TolerantWrite
        } else {
            Access::Write
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything an adapter reads while building or interpreting a call.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    /// Device identity.
    pub info: &'a DeviceInfo,
    /// Account session.
    pub session: &'a Session,
    /// Capability profile.
    pub profile: &'a CapabilityProfile,
    /// State before the call.
    pub state: &'a DeviceState,
}

impl<'a> AdapterContext<'a> {
    /// Bundles the inputs of an adapter call.
    #[must_use]
    pub fn new(
        info: &'a DeviceInfo,
        session: &'a Session,
        profile: &'a CapabilityProfile,
        state: &'a DeviceState,
    ) -> Self {
        Self {
            info,
            session,
            profile,
            state,
        }
    }

    fn unavailable(&self, op: &Operation) -> DeviceError {
        DeviceError::OperationUnavailable {
            operation: op.name(),
            device_type: self.info.device_type.clone(),
        }
    }
}

/// Request builder and response interpreter for one [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAdapter {
    variant: Variant,
}

impl ProtocolAdapter {
    /// Creates the adapter for a variant.
    #[must_use]
    pub const fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// Returns the variant.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Builds the request for an operation.
    ///
    /// Arguments are assumed to be validated against the profile already.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::OperationUnavailable` if this variant has no
    /// request for the operation on the device's family.
    pub fn prepare(&self, ctx: &AdapterContext<'_>, op: &Operation) -> Result<ApiRequest, DeviceError> {
        // No request shape is known for an unregistered device type.
        if ctx.profile.family == Family::Unknown {
            return Err(ctx.unavailable(op));
        }
        match self.variant {
            Variant::LegacyFlat => legacy::prepare(ctx, op),
            Variant::BypassV1 | Variant::BypassV2 => bypass::prepare(self.variant, ctx, op),
            Variant::VitalQuirk => vital::prepare(ctx, op),
        }
    }

    /// Turns a success-classified response body into a state change.
    ///
    /// Writes are applied optimistically from the requested value, with
    /// the family's derived-field rules. Reads and timer creation parse the
    /// response payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload does not match the schema.
    pub fn interpret(
        &self,
        ctx: &AdapterContext<'_>,
        op: &Operation,
        body: &Value,
    ) -> Result<StateChange, ParseError> {
        match self.variant {
            Variant::LegacyFlat => legacy::interpret(ctx, op, body),
            Variant::BypassV1 | Variant::BypassV2 => bypass::interpret(self.variant, ctx, op, body),
            Variant::VitalQuirk => vital::interpret(ctx, op, body),
        }
    }
}

// ============================================================================
// Derived-field rules
// ============================================================================

const MANUAL_MODES: [&str; 2] = ["manual", "normal"];
const SLEEP_MODES: [&str; 2] = ["sleep", "advancedSleep"];

/// Returns the level manual mode resumes at: the current level if the
/// profile lists it, otherwise the lowest level.
fn manual_level(ctx: &AdapterContext<'_>) -> u8 {
    let current = ctx.state.level();
    if ctx.profile.supports_level(current) {
        current
    } else {
        ctx.profile.min_level().unwrap_or(0)
    }
}

/// Change for a successful mode switch, with its effect on the level.
///
/// On families whose mode drives the fan: sleep shows level 0, turbo the
/// highest level, manual resumes [`manual_level`]. Auto leaves the level to
/// the next fetch.
fn mode_change(ctx: &AdapterContext<'_>, mode: &str) -> StateChange {
    let mut changes = vec![StateChange::Mode(mode.to_string())];
    if ctx.profile.family.has_mode_driven_level() {
        if SLEEP_MODES.contains(&mode) {
            changes.push(StateChange::Level(0));
        } else if mode == "turbo" {
            if let Some(max) = ctx.profile.max_level() {
                changes.push(StateChange::Level(max));
            }
        } else if MANUAL_MODES.contains(&mode) {
            changes.push(StateChange::Level(manual_level(ctx)));
        }
    }
    StateChange::Batch(changes)
}

/// Change for a successful level change; the device drops into manual.
fn level_change(ctx: &AdapterContext<'_>, level: u8) -> StateChange {
    let mut changes = vec![StateChange::Level(level)];
    if let Some(manual) = MANUAL_MODES.iter().find(|m| ctx.profile.supports_mode(m)) {
        changes.push(StateChange::Mode((*manual).to_string()));
    }
    StateChange::Batch(changes)
}

/// Timer change from the countdown reported by a detail fetch.
///
/// The countdown carries no id; a tracked id is kept when one exists.
fn timer_from_remain(ctx: &AdapterContext<'_>, remain: Option<u32>) -> Option<StateChange> {
    match remain? {
        0 => Some(StateChange::Timer(None)),
        remain => {
            let tracked = ctx.state.timer();
            let timer = Timer::new(
                tracked.and_then(Timer::id),
                tracked.map(Timer::action).unwrap_or_default(),
                tracked.map_or(remain, |t| t.total_seconds().max(remain)),
                remain,
            );
            Some(StateChange::Timer(Some(timer)))
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: Option<&Value>) -> Result<T, ParseError> {
    let payload = payload.ok_or_else(|| ParseError::MissingField("result.result".to_string()))?;
    Ok(serde_json::from_value(payload.clone())?)
}

fn switch(on: bool) -> u8 {
    u8::from(on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    fn ctx_fixture<'a>(
        info: &'a DeviceInfo,
        session: &'a Session,
        profile: &'a CapabilityProfile,
        state: &'a DeviceState,
    ) -> AdapterContext<'a> {
        AdapterContext::new(info, session, profile, state)
    }

    #[test]
    fn operation_access() {
        let power = Operation::Power(PowerStatus::On);
        assert_eq!(power.access(Variant::VitalQuirk), Access::TolerantWrite);
        assert_eq!(power.access(Variant::BypassV2), Access::Write);
        assert_eq!(Operation::Display(true).access(Variant::VitalQuirk), Access::Write);
        assert_eq!(Operation::Details.access(Variant::VitalQuirk), Access::Read);
    }

    #[test]
    fn operation_features() {
        assert_eq!(Operation::Level(1).feature(), None);
        assert_eq!(Operation::GetTimer.feature(), Some(FeatureTag::Timer));
        assert_eq!(Operation::WarmMistLevel(1).feature(), Some(FeatureTag::WarmMist));
    }

    #[test]
    fn sleep_zeroes_level() {
        let info = DeviceInfo::new("c", "Core400S");
        let session = Session::new("1", "t");
        let profile = registry::lookup("Core400S");
        let mut state = DeviceState::new();
        state.apply(&StateChange::Level(2));
        let ctx = ctx_fixture(&info, &session, profile, &state);

        let mut after = state.clone();
        after.apply(&mode_change(&ctx, "sleep"));
        assert_eq!(after.level(), 0);
        assert_eq!(after.mode(), "sleep");
    }

    #[test]
    fn turbo_shows_max_level() {
        let info = DeviceInfo::new("c", "LAP-EL551S-WUS");
        let session = Session::new("1", "t");
        let profile = registry::lookup("LAP-EL551S-WUS");
        let state = DeviceState::new();
        let ctx = ctx_fixture(&info, &session, profile, &state);

        assert_eq!(
            mode_change(&ctx, "turbo"),
            StateChange::Batch(vec![
                StateChange::Mode("turbo".into()),
                StateChange::Level(3)
            ])
        );
    }

    #[test]
    fn manual_resumes_valid_level_or_minimum() {
        let info = DeviceInfo::new("c", "Core300S");
        let session = Session::new("1", "t");
        let profile = registry::lookup("Core300S");
        let mut state = DeviceState::new();
        let ctx = ctx_fixture(&info, &session, profile, &state);
        assert_eq!(manual_level(&ctx), 1);

        state.apply(&StateChange::Level(3));
        let ctx = ctx_fixture(&info, &session, profile, &state);
        assert_eq!(manual_level(&ctx), 3);
    }

    #[test]
    fn auto_leaves_level_alone() {
        let info = DeviceInfo::new("c", "Core300S");
        let session = Session::new("1", "t");
        let profile = registry::lookup("Core300S");
        let state = DeviceState::new();
        let ctx = ctx_fixture(&info, &session, profile, &state);
        assert_eq!(
            mode_change(&ctx, "auto"),
            StateChange::Batch(vec![StateChange::Mode("auto".into())])
        );
    }

    #[test]
    fn humidifier_mode_keeps_mist_level() {
        let info = DeviceInfo::new("c", "Classic300S");
        let session = Session::new("1", "t");
        let profile = registry::lookup("Classic300S");
        let state = DeviceState::new();
        let ctx = ctx_fixture(&info, &session, profile, &state);
        assert_eq!(
            mode_change(&ctx, "sleep"),
            StateChange::Batch(vec![StateChange::Mode("sleep".into())])
        );
    }

    #[test]
    fn level_change_switches_to_manual_or_normal() {
        let session = Session::new("1", "t");
        let state = DeviceState::new();

        let info = DeviceInfo::new("c", "Core300S");
        let ctx = ctx_fixture(&info, &session, registry::lookup("Core300S"), &state);
        assert_eq!(
            level_change(&ctx, 2),
            StateChange::Batch(vec![StateChange::Level(2), StateChange::Mode("manual".into())])
        );

        let info = DeviceInfo::new("c", "LTF-F422S-KEU");
        let ctx = ctx_fixture(&info, &session, registry::lookup("LTF-F422S-KEU"), &state);
        assert_eq!(
            level_change(&ctx, 5),
            StateChange::Batch(vec![StateChange::Level(5), StateChange::Mode("normal".into())])
        );
    }

    #[test]
    fn timer_from_remain_keeps_tracked_id() {
        let info = DeviceInfo::new("c", "Core300S");
        let session = Session::new("1", "t");
        let profile = registry::lookup("Core300S");
        let mut state = DeviceState::new();
        state.apply(&StateChange::Timer(Some(Timer::new(
            Some(42),
            TimerAction::Off,
            600,
            600,
        ))));
        let ctx = ctx_fixture(&info, &session, profile, &state);

        let Some(StateChange::Timer(Some(timer))) = timer_from_remain(&ctx, Some(300)) else {
            panic!("expected a timer");
        };
        assert_eq!(timer.id(), Some(42));
        assert_eq!(timer.total_seconds(), 600);
        assert_eq!(timer.reported_remaining(), 300);

        assert_eq!(timer_from_remain(&ctx, Some(0)), Some(StateChange::Timer(None)));
        assert_eq!(timer_from_remain(&ctx, None), None);
    }
}
