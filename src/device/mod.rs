// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device abstraction.
//!
//! A [`Device`] owns one physical device's state and runs every command
//! through the same pipeline:
//!
//! 1. check the feature gate and the argument against the capability
//!    profile (violations are errors, raised before any network call)
//! 2. let the variant adapter build the request
//! 3. execute it through the shared [`Transport`]
//! 4. classify the response envelope
//! 5. on success, apply the resulting state change in one step
//! 6. on vital-quirk writes, schedule a reconciliation refresh
//!
//! A vendor refusing a well-formed command is reported as `Ok(false)`;
//! the classified [`Outcome`] is kept and available from
//! [`Device::last_outcome`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use vesync_lib::{Device, DeviceInfo};
//! use vesync_lib::protocol::MockTransport;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> vesync_lib::Result<()> {
//! let transport = Arc::new(MockTransport::new());
//! let device = Device::new(Arc::clone(&transport), DeviceInfo::new("cid-1", "Core300S"));
//!
//! transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {}}}));
//! assert!(device.turn_on().await?);
//! assert!(device.is_on());
//!
//! // Level 5 is not valid for a Core300S: no call is placed.
//! assert!(!device.change_level(5).await?);
//! assert_eq!(transport.call_count(), 1);
//! # Ok(())
//! # }
//! ```

mod builder;
mod info;

pub use builder::DeviceBuilder;
pub use info::DeviceInfo;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use crate::capabilities::{CapabilityProfile, Family, FeatureTag, Variant};
use crate::command::{AdapterContext, Operation, ProtocolAdapter};
use crate::error::{DeviceError, Error, ParseError, ValueError};
use crate::protocol::Transport;
use crate::reconcile::{ReconcilePolicy, Refresh, schedule_refresh};
use crate::response::{Outcome, VendorCode, classify_access};
use crate::state::{DeviceState, StateChange, Timer};
use crate::types::{
    AirQuality, AutoPreference, Brightness, Connectivity, NightLight, PowerStatus, TargetHumidity,
    TimerAction,
};

/// A purifier, humidifier or fan reachable through the vendor cloud.
///
/// Cloning a `Device` is cheap and yields a handle to the same state.
///
/// # Type Parameter
///
/// `T` is the transport shared by every device of an account:
/// [`HttpTransport`](crate::protocol::HttpTransport) in production,
/// [`MockTransport`](crate::protocol::MockTransport) in tests.
#[derive(Debug)]
pub struct Device<T: Transport> {
    transport: Arc<T>,
    info: Arc<RwLock<DeviceInfo>>,
    profile: Arc<CapabilityProfile>,
    adapter: ProtocolAdapter,
    state: Arc<RwLock<DeviceState>>,
    last_outcome: Arc<RwLock<Option<Outcome>>>,
    policy: ReconcilePolicy,
    generation: Arc<AtomicU64>,
}

impl<T: Transport> Clone for Device<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            info: Arc::clone(&self.info),
            profile: Arc::clone(&self.profile),
            adapter: self.adapter,
            state: Arc::clone(&self.state),
            last_outcome: Arc::clone(&self.last_outcome),
            policy: self.policy,
            generation: Arc::clone(&self.generation),
        }
    }
}

/// Serializable view of a device: identity, profile summary and state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    /// Identity from the device listing.
    pub info: DeviceInfo,
    /// Model name of the capability profile.
    pub model: String,
    /// Envelope variant.
    pub variant: Variant,
    /// Product family.
    pub family: Family,
    /// Current state.
    pub state: DeviceState,
    /// Classification of the most recent call, if any.
    pub last_outcome: Option<Outcome>,
}

impl<T: Transport + 'static> Device<T> {
    /// Creates a device whose profile is looked up from its device type.
    ///
    /// Unknown device types get the empty fallback profile: the device
    /// keeps its identity and state, but every operation is refused before
    /// any network call.
    #[must_use]
    pub fn new(transport: Arc<T>, info: DeviceInfo) -> Self {
        DeviceBuilder::new(transport, info).build()
    }

    /// Creates a builder for a device.
    #[must_use]
    pub fn builder(transport: Arc<T>, info: DeviceInfo) -> DeviceBuilder<T> {
        DeviceBuilder::new(transport, info)
    }

    pub(crate) fn from_parts(
        transport: Arc<T>,
        info: DeviceInfo,
        profile: CapabilityProfile,
        policy: ReconcilePolicy,
    ) -> Self {
        let mut state = DeviceState::new();
        state.apply(&StateChange::Connectivity(info.connectivity()));
        if profile.is_fallback() {
            tracing::warn!(
                cid = %info.cid,
                device_type = %info.device_type,
                "Unknown device type, using fallback profile"
            );
        }
        Self {
            transport,
            adapter: ProtocolAdapter::new(profile.variant),
            info: Arc::new(RwLock::new(info)),
            profile: Arc::new(profile),
            state: Arc::new(RwLock::new(state)),
            last_outcome: Arc::new(RwLock::new(None)),
            policy,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    // ========== Identity ==========

    /// Returns the capability profile.
    #[must_use]
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// Returns the product family.
    #[must_use]
    pub fn family(&self) -> Family {
        self.profile.family
    }

    /// Returns whether the profile lists a feature.
    #[must_use]
    pub fn has_feature(&self, feature: FeatureTag) -> bool {
        self.profile.has_feature(feature)
    }

    /// Returns a copy of the device identity.
    #[must_use]
    pub fn info(&self) -> DeviceInfo {
        self.info.read().clone()
    }

    /// Returns the cloud id.
    #[must_use]
    pub fn cid(&self) -> String {
        self.info.read().cid.clone()
    }

    /// Returns the reconciliation policy.
    #[must_use]
    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Replaces the identity with a newer listing entry.
    ///
    /// The listed connection status is applied to the state; the profile
    /// is kept, since the device type is immutable.
    pub(crate) fn refresh_identity(&self, info: DeviceInfo) {
        let connectivity = info.connectivity();
        *self.info.write() = info;
        self.state
            .write()
            .apply(&StateChange::Connectivity(connectivity));
    }

    // ========== State ==========

    /// Returns a snapshot of the current device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Returns the classification of the most recent call.
    ///
    /// After a command returned `Ok(false)`, this tells a vendor rejection
    /// apart from an unsupported feature or an offline device.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome.read().clone()
    }

    /// Returns a serializable snapshot of identity and state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            info: self.info(),
            model: self.profile.model.clone(),
            variant: self.profile.variant,
            family: self.profile.family,
            state: self.state(),
            last_outcome: self.last_outcome(),
        }
    }

    /// Serializes [`Device::snapshot`] as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| Error::Parse(ParseError::Json(e)))
    }

    /// Returns the power status.
    #[must_use]
    pub fn power(&self) -> PowerStatus {
        self.state.read().power()
    }

    /// Returns `true` if the device is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power().is_on()
    }

    /// Returns the current mode, empty before the first detail fetch.
    #[must_use]
    pub fn mode(&self) -> String {
        self.state.read().mode().to_string()
    }

    /// Returns the current level, 0 when no level is active.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.state.read().level()
    }

    /// Returns `true` if the display is on.
    #[must_use]
    pub fn is_display_on(&self) -> bool {
        self.state.read().display_on()
    }

    /// Returns the connectivity.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.state.read().connectivity()
    }

    /// Returns the tracked timer.
    #[must_use]
    pub fn timer(&self) -> Option<Timer> {
        self.state.read().timer().cloned()
    }

    /// Returns whether the child lock is engaged.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` if the device has no
    /// child lock.
    pub fn is_child_lock_on(&self) -> Result<bool, Error> {
        self.read_gated(FeatureTag::ChildLock, DeviceState::child_lock_on)
    }

    /// Returns the air quality index.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without an air quality
    /// sensor.
    pub fn air_quality(&self) -> Result<Option<AirQuality>, Error> {
        self.read_gated(FeatureTag::AirQuality, DeviceState::air_quality)
    }

    /// Returns the PM2.5 reading in µg/m³.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without an air quality
    /// sensor.
    pub fn pm25(&self) -> Result<Option<u16>, Error> {
        self.read_gated(FeatureTag::AirQuality, DeviceState::pm25)
    }

    /// Returns the remaining filter life in percent.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without filter tracking.
    pub fn filter_life(&self) -> Result<Option<u8>, Error> {
        self.read_gated(FeatureTag::FilterLife, DeviceState::filter_life)
    }

    /// Returns the measured relative humidity.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a humidity sensor.
    pub fn humidity(&self) -> Result<Option<u8>, Error> {
        self.read_gated(FeatureTag::Humidity, DeviceState::humidity)
    }

    /// Returns the target humidity.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` if no target can be set.
    pub fn target_humidity(&self) -> Result<Option<u8>, Error> {
        self.read_gated(FeatureTag::TargetHumidity, DeviceState::target_humidity)
    }

    /// Returns `true` if the water tank is empty.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` for non-humidifiers.
    pub fn water_lacks(&self) -> Result<bool, Error> {
        self.read_gated(FeatureTag::Humidity, DeviceState::water_lacks)
    }

    /// Returns the warm mist level.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without warm mist.
    pub fn warm_mist_level(&self) -> Result<Option<u8>, Error> {
        self.read_gated(FeatureTag::WarmMist, DeviceState::warm_mist_level)
    }

    /// Returns the night light setting.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a night light.
    pub fn night_light(&self) -> Result<Option<NightLight>, Error> {
        self.read_gated(FeatureTag::NightLight, DeviceState::night_light)
    }

    /// Returns the night light brightness.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a dimmable night
    /// light.
    pub fn night_light_brightness(&self) -> Result<Option<u8>, Error> {
        self.read_gated(
            FeatureTag::NightLightBrightness,
            DeviceState::night_light_brightness,
        )
    }

    /// Returns `true` if oscillation is on.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` for devices that cannot
    /// oscillate.
    pub fn oscillation(&self) -> Result<bool, Error> {
        self.read_gated(FeatureTag::Oscillation, DeviceState::oscillation)
    }

    /// Returns `true` if light detection is on.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a light sensor.
    pub fn light_detection(&self) -> Result<bool, Error> {
        self.read_gated(FeatureTag::LightDetection, DeviceState::light_detection)
    }

    /// Returns the auto-mode preference.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without auto preferences.
    pub fn auto_preference(&self) -> Result<Option<AutoPreference>, Error> {
        self.read_gated(FeatureTag::AutoPreference, |s| s.auto_preference().cloned())
    }

    // ========== Details ==========

    /// Fetches the full status and replaces the state with it.
    ///
    /// A completed fetch supersedes any pending reconciliation refresh.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn get_details(&self) -> Result<bool, Error> {
        let fetched = self.execute(Operation::Details).await?;
        if fetched {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        Ok(fetched)
    }

    // ========== Power ==========

    /// Turns the device on.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn turn_on(&self) -> Result<bool, Error> {
        self.set_power(PowerStatus::On).await
    }

    /// Turns the device off.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn turn_off(&self) -> Result<bool, Error> {
        self.set_power(PowerStatus::Off).await
    }

    /// Flips the power status as currently known.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn toggle(&self) -> Result<bool, Error> {
        let target = self.power().toggled();
        self.set_power(target).await
    }

    /// Sets the power status.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn set_power(&self, power: PowerStatus) -> Result<bool, Error> {
        self.execute(Operation::Power(power)).await
    }

    // ========== Level & Mode ==========

    /// Changes the fan speed (purifiers, fans) or mist level (humidifiers).
    ///
    /// Returns `Ok(false)` without a network call if `level` is not one of
    /// the profile's levels.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    pub async fn change_level(&self, level: u8) -> Result<bool, Error> {
        if !self.profile.supports_level(level) {
            tracing::debug!(
                cid = %self.cid(),
                level,
                supported = ?self.profile.levels,
                "Level not supported, no call placed"
            );
            return Ok(false);
        }
        self.execute(Operation::Level(level)).await
    }

    /// Changes the operating mode.
    ///
    /// On the Core200S, `"auto"` is sent as `"manual"`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMode` if the profile does not list the
    /// mode, or error if the transport fails.
    pub async fn set_mode(&self, mode: &str) -> Result<bool, Error> {
        let mode = if mode == "auto" && self.profile.redirect_auto_to_manual {
            tracing::debug!(cid = %self.cid(), "Auto mode redirected to manual");
            "manual"
        } else {
            mode
        };
        if !self.profile.supports_mode(mode) {
            return Err(ValueError::InvalidMode {
                mode: mode.to_string(),
                supported: self.profile.modes.clone(),
            }
            .into());
        }
        self.execute(Operation::Mode(mode.to_string())).await
    }

    /// Switches to manual mode (`"normal"` on fans).
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMode` if the device has no manual mode,
    /// or error if the transport fails.
    pub async fn set_manual_mode(&self) -> Result<bool, Error> {
        let mode = self.first_supported(&["manual", "normal"]);
        self.set_mode(mode).await
    }

    /// Switches to auto mode.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMode` if the device has no auto mode,
    /// or error if the transport fails.
    pub async fn set_auto_mode(&self) -> Result<bool, Error> {
        self.set_mode("auto").await
    }

    /// Switches to sleep mode (`"advancedSleep"` on fans).
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMode` if the device has no sleep mode,
    /// or error if the transport fails.
    pub async fn set_sleep_mode(&self) -> Result<bool, Error> {
        let mode = self.first_supported(&["sleep", "advancedSleep"]);
        self.set_mode(mode).await
    }

    // ========== Display & Child Lock ==========

    /// Switches the display.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a switchable
    /// display, or error if the transport fails.
    pub async fn set_display(&self, on: bool) -> Result<bool, Error> {
        self.execute(Operation::Display(on)).await
    }

    /// Turns the display on.
    ///
    /// # Errors
    ///
    /// See [`Device::set_display`].
    pub async fn display_on(&self) -> Result<bool, Error> {
        self.set_display(true).await
    }

    /// Turns the display off.
    ///
    /// # Errors
    ///
    /// See [`Device::set_display`].
    pub async fn display_off(&self) -> Result<bool, Error> {
        self.set_display(false).await
    }

    /// Engages or releases the child lock.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a child lock, or
    /// error if the transport fails.
    pub async fn set_child_lock(&self, on: bool) -> Result<bool, Error> {
        self.execute(Operation::ChildLock(on)).await
    }

    /// Engages the child lock.
    ///
    /// # Errors
    ///
    /// See [`Device::set_child_lock`].
    pub async fn child_lock_on(&self) -> Result<bool, Error> {
        self.set_child_lock(true).await
    }

    /// Releases the child lock.
    ///
    /// # Errors
    ///
    /// See [`Device::set_child_lock`].
    pub async fn child_lock_off(&self) -> Result<bool, Error> {
        self.set_child_lock(false).await
    }

    // ========== Timer ==========

    /// Arms a countdown timer.
    ///
    /// Returns `Ok(false)` without a network call for a zero countdown.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without timers, or error
    /// if the transport fails.
    pub async fn set_timer(&self, seconds: u32, action: TimerAction) -> Result<bool, Error> {
        self.require(FeatureTag::Timer)?;
        if seconds == 0 {
            tracing::debug!(cid = %self.cid(), "Zero countdown, no call placed");
            return Ok(false);
        }
        self.execute(Operation::SetTimer { seconds, action }).await
    }

    /// Reads the armed timer back from the vendor.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without timers, or error
    /// if the transport fails.
    pub async fn get_timer(&self) -> Result<bool, Error> {
        self.execute(Operation::GetTimer).await
    }

    /// Cancels the tracked timer.
    ///
    /// Returns `Ok(true)` without a network call when no timer is tracked.
    /// A timer seen only as a countdown in a detail fetch has no id; it is
    /// read back with [`Device::get_timer`] first.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without timers, or error
    /// if the transport fails.
    pub async fn clear_timer(&self) -> Result<bool, Error> {
        self.require(FeatureTag::Timer)?;
        let tracked = self.timer();
        let Some(tracked) = tracked else {
            tracing::debug!(cid = %self.cid(), "No timer tracked, nothing to clear");
            return Ok(true);
        };

        let id = match tracked.id() {
            Some(id) => id,
            None => {
                if !self.get_timer().await? {
                    return Ok(false);
                }
                match self.timer().and_then(|t| t.id()) {
                    Some(id) => id,
                    None => return Ok(true),
                }
            }
        };
        self.execute(Operation::ClearTimer { id }).await
    }

    // ========== Feature extras ==========

    /// Sets the night light.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a night light, or
    /// error if the transport fails.
    pub async fn set_night_light(&self, setting: NightLight) -> Result<bool, Error> {
        self.execute(Operation::NightLight(setting)).await
    }

    /// Sets the night light brightness in percent.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a dimmable night
    /// light, `ValueError::OutOfRange` above 100, or error if the transport
    /// fails.
    pub async fn set_night_light_brightness(&self, percent: u8) -> Result<bool, Error> {
        self.require(FeatureTag::NightLightBrightness)?;
        let brightness = Brightness::new(percent)?;
        self.execute(Operation::NightLightBrightness(brightness)).await
    }

    /// Switches oscillation.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` for devices that cannot
    /// oscillate, or error if the transport fails.
    pub async fn set_oscillation(&self, on: bool) -> Result<bool, Error> {
        self.execute(Operation::Oscillation(on)).await
    }

    /// Sets the auto-mode preference.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without auto preferences,
    /// `ValueError::InvalidAutoPreference` for a kind the profile does not
    /// list, or error if the transport fails.
    pub async fn set_auto_preference(&self, preference: AutoPreference) -> Result<bool, Error> {
        self.require(FeatureTag::AutoPreference)?;
        if !self.profile.supports_auto_preference(&preference.kind) {
            return Err(ValueError::InvalidAutoPreference(preference.kind).into());
        }
        self.execute(Operation::AutoPreference(preference)).await
    }

    /// Switches light detection.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without a light sensor, or
    /// error if the transport fails.
    pub async fn set_light_detection(&self, on: bool) -> Result<bool, Error> {
        self.execute(Operation::LightDetection(on)).await
    }

    /// Sets the target humidity in percent.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` if no target can be set,
    /// `ValueError::OutOfRange` outside 30..=80, or error if the transport
    /// fails.
    pub async fn set_target_humidity(&self, percent: u8) -> Result<bool, Error> {
        self.require(FeatureTag::TargetHumidity)?;
        let target = TargetHumidity::new(percent)?;
        self.execute(Operation::TargetHumidity(target)).await
    }

    /// Sets the warm mist level.
    ///
    /// Returns `Ok(false)` without a network call if the profile does not
    /// list the level.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::FeatureUnsupported` without warm mist, or
    /// error if the transport fails.
    pub async fn set_warm_mist_level(&self, level: u8) -> Result<bool, Error> {
        self.require(FeatureTag::WarmMist)?;
        if !self.profile.warm_levels.contains(&level) {
            tracing::debug!(cid = %self.cid(), level, "Warm mist level not supported");
            return Ok(false);
        }
        self.execute(Operation::WarmMistLevel(level)).await
    }

    // ========== Pipeline ==========

    async fn execute(&self, op: Operation) -> Result<bool, Error> {
        if let Some(feature) = op.feature() {
            self.require(feature)?;
        }
        let variant = self.adapter.variant();

        let request = {
            let info = self.info.read();
            let state = self.state.read();
            let ctx = AdapterContext::new(&info, self.transport.session(), &self.profile, &state);
            self.adapter.prepare(&ctx, &op)?
        };

        tracing::debug!(cid = %self.cid(), operation = %op, path = %request.path, "Executing operation");
        let response = self.transport.call(&request).await?;

        let outcome = classify_access(response.status, &response.body, variant, op.access(variant));
        if !outcome.success {
            self.reject(&op, outcome);
            return Ok(false);
        }
        if outcome.inner_code_ignored {
            tracing::debug!(
                cid = %self.cid(),
                operation = %op,
                "Stale inner code tolerated"
            );
        }

        let applied = {
            let info = self.info.read();
            let mut state = self.state.write();
            let ctx = AdapterContext::new(&info, self.transport.session(), &self.profile, &state);
            match self.adapter.interpret(&ctx, &op, &response.body) {
                Ok(change) => {
                    if let Some(change) = change.normalize(&self.profile) {
                        state.apply_optimistic(&outcome, &change);
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            }
        };
        if let Err(err) = applied {
            tracing::warn!(
                cid = %self.cid(),
                operation = %op,
                error = %err,
                "Response does not match the expected schema"
            );
            *self.last_outcome.write() = Some(Outcome::failure(response.status, None));
            return Ok(false);
        }
        *self.last_outcome.write() = Some(outcome);

        if !op.is_read() && variant.needs_reconciliation() {
            schedule_refresh(self.clone(), &self.policy);
        }
        Ok(true)
    }

    fn reject(&self, op: &Operation, outcome: Outcome) {
        if outcome.is_offline() {
            self.state
                .write()
                .apply(&StateChange::Connectivity(Connectivity::Offline));
        }
        let reason = outcome
            .rejection()
            .map(|r| r.to_string())
            .unwrap_or_default();
        if outcome.is_feature_unsupported() {
            tracing::info!(
                cid = %self.cid(),
                operation = %op,
                "Vendor reports the feature as unsupported"
            );
        } else {
            tracing::warn!(
                cid = %self.cid(),
                operation = %op,
                status = outcome.status,
                code = ?outcome.vendor_code.map(VendorCode::value),
                message = ?outcome.message,
                reason = %reason,
                "Command rejected"
            );
        }
        *self.last_outcome.write() = Some(outcome);
    }

    fn require(&self, feature: FeatureTag) -> Result<(), Error> {
        if self.profile.has_feature(feature) {
            Ok(())
        } else {
            Err(DeviceError::FeatureUnsupported { feature }.into())
        }
    }

    fn read_gated<R>(
        &self,
        feature: FeatureTag,
        read: impl FnOnce(&DeviceState) -> R,
    ) -> Result<R, Error> {
        self.require(feature)?;
        Ok(read(&*self.state.read()))
    }

    fn first_supported<'a>(&self, candidates: &[&'a str]) -> &'a str {
        candidates
            .iter()
            .copied()
            .find(|m| self.profile.supports_mode(m))
            .unwrap_or(candidates[0])
    }
}

impl<T: Transport + 'static> Refresh for Device<T> {
    // Leaves the generation alone: only a caller's fetch supersedes.
    async fn refresh(&self) -> bool {
        match self.execute(Operation::Details).await {
            Ok(success) => success,
            Err(err) => {
                tracing::warn!(cid = %self.cid(), error = %err, "Refresh failed");
                false
            }
        }
    }

    fn refresh_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn label(&self) -> String {
        self.cid()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;
    use crate::capabilities::ProfileBuilder;
    use crate::protocol::MockTransport;
    use crate::response::Rejection;

    fn bypass_ok(result: Value) -> Value {
        json!({"code": 0, "msg": "request success", "result": {"code": 0, "result": result}})
    }

    fn device(device_type: &str) -> (Arc<MockTransport>, Device<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let mut info = DeviceInfo::new(format!("cid-{device_type}"), device_type);
        info.connection_status = "online".to_string();
        let device = Device::builder(Arc::clone(&transport), info)
            .with_reconcile_policy(ReconcilePolicy::disabled())
            .build();
        (transport, device)
    }

    fn scenario_device() -> (Arc<MockTransport>, Device<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let profile = ProfileBuilder::new(Variant::BypassV2, Family::AirPurifier)
            .model("Scenario")
            .levels([1, 2, 3, 4])
            .modes(["auto", "manual", "sleep"])
            .build();
        let device = Device::builder(Arc::clone(&transport), DeviceInfo::new("cid-s", "Scenario"))
            .with_profile(profile)
            .with_reconcile_policy(ReconcilePolicy::disabled())
            .build();
        (transport, device)
    }

    #[tokio::test]
    async fn scenario_level_mode_and_sleep() {
        let (transport, device) = scenario_device();
        transport.push_ok(bypass_ok(json!({})));
        assert!(device.set_mode("manual").await.unwrap());
        transport.push_ok(bypass_ok(json!({})));
        assert!(device.change_level(2).await.unwrap());
        assert_eq!(device.mode(), "manual");
        assert_eq!(device.level(), 2);
        let calls = transport.call_count();

        assert!(!device.change_level(5).await.unwrap());
        assert_eq!(transport.call_count(), calls);
        assert_eq!(device.level(), 2);

        let err = device.set_mode("turbo").await.unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidMode { .. })));
        assert_eq!(transport.call_count(), calls);

        transport.push_ok(bypass_ok(json!({})));
        assert!(device.set_mode("sleep").await.unwrap());
        assert_eq!(device.mode(), "sleep");
        assert_eq!(device.level(), 0);
    }

    #[tokio::test]
    async fn turbo_shows_max_level() {
        let (transport, device) = device("LAP-EL551S-WUS");
        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {}}}));
        assert!(device.set_mode("turbo").await.unwrap());
        assert_eq!(transport.last_call().unwrap().bypass_method(), Some("setPurifierMode"));
        assert_eq!(device.mode(), "turbo");
        assert_eq!(device.level(), 3);
    }

    #[tokio::test]
    async fn vital_read_tolerates_stale_inner_code() {
        let (transport, device) = device("LAP-V201S-WUS");
        transport.push_ok(json!({
            "code": 0,
            "result": {"code": -1, "result": {
                "powerSwitch": 1, "workMode": "pet", "fanSpeedLevel": 3,
                "screenSwitch": 1, "filterLifePercent": 90, "AQLevel": 1, "PM25": 4
            }}
        }));

        assert!(device.get_details().await.unwrap());
        assert!(device.is_on());
        assert_eq!(device.mode(), "pet");
        assert_eq!(device.level(), 3);
        assert_eq!(device.filter_life().unwrap(), Some(90));
        assert_eq!(device.pm25().unwrap(), Some(4));
        assert!(device.last_outcome().unwrap().inner_code_ignored);
    }

    #[tokio::test]
    async fn vital_strict_write_rejects_inner_code() {
        let (transport, device) = device("LAP-V201S-WUS");
        transport.push_ok(json!({"code": 0, "result": {"code": -1, "result": {}}}));
        assert!(!device.set_display(true).await.unwrap());
        assert!(!device.is_display_on());

        transport.push_ok(json!({"code": 0, "result": {"code": -1, "result": {}}}));
        assert!(device.turn_on().await.unwrap());
        assert!(device.is_on());
    }

    #[tokio::test]
    async fn missing_feature_is_an_error_without_mutation() {
        let (transport, device) = device("LV-PUR131S");
        let before = device.state();

        let err = device.set_child_lock(true).await.unwrap_err();
        assert!(err.is_feature_unsupported());
        assert_eq!(device.state(), before);
        assert_eq!(transport.call_count(), 0);
        assert!(device.is_child_lock_on().is_err());
    }

    #[tokio::test]
    async fn clear_timer_without_timer_is_idempotent() {
        let (transport, device) = device("Core300S");
        assert!(device.clear_timer().await.unwrap());
        assert!(device.clear_timer().await.unwrap());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn clear_timer_clears_then_noops() {
        let (transport, device) = device("Core300S");
        transport.push_ok(bypass_ok(json!({"id": 9})));
        assert!(device.set_timer(600, TimerAction::Off).await.unwrap());
        assert_eq!(device.timer().and_then(|t| t.id()), Some(9));

        transport.push_ok(bypass_ok(json!({})));
        assert!(device.clear_timer().await.unwrap());
        assert_eq!(transport.last_call().unwrap().body["payload"]["data"]["id"], 9);
        assert!(device.timer().is_none());

        assert!(device.clear_timer().await.unwrap());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn clear_timer_reads_back_unknown_id() {
        let (transport, device) = device("Core300S");
        transport.push_ok(bypass_ok(json!({
            "enabled": true, "mode": "manual", "level": 2, "display": true,
            "extension": {"timer_remain": 300}
        })));
        assert!(device.get_details().await.unwrap());
        assert_eq!(device.timer().and_then(|t| t.id()), None);

        transport.push_ok(bypass_ok(json!({"timers": [{"id": 4, "remain": 290, "total": 600}]})));
        transport.push_ok(bypass_ok(json!({})));
        assert!(device.clear_timer().await.unwrap());

        let methods: Vec<_> = transport
            .calls()
            .iter()
            .filter_map(|c| c.bypass_method().map(str::to_string))
            .collect();
        assert_eq!(methods, ["getPurifierStatus", "getTimer", "delTimer"]);
        assert!(device.timer().is_none());
    }

    #[tokio::test]
    async fn details_round_trip() {
        let (transport, device) = device("Core400S");
        transport.push_ok(bypass_ok(json!({
            "enabled": true, "filter_life": 64, "mode": "manual", "level": 3,
            "air_quality": 2, "air_quality_value": 12, "display": false,
            "child_lock": true, "device_error_code": 0
        })));
        assert!(device.get_details().await.unwrap());

        assert!(device.is_on());
        assert_eq!(device.mode(), "manual");
        assert_eq!(device.level(), 3);
        assert!(!device.is_display_on());
        assert!(device.is_child_lock_on().unwrap());
        assert_eq!(device.filter_life().unwrap(), Some(64));
        assert_eq!(device.air_quality().unwrap().map(|q| q.level()), Some(2));
        assert_eq!(device.pm25().unwrap(), Some(12));
        assert_eq!(device.connectivity(), Connectivity::Online);
    }

    #[tokio::test]
    async fn offline_rejection_marks_device_offline() {
        let (transport, device) = device("Core300S");
        transport.push_ok(json!({"code": -11_300_030, "msg": "device offline"}));

        assert!(!device.turn_on().await.unwrap());
        assert!(!device.is_on());
        assert_eq!(device.connectivity(), Connectivity::Offline);
        let outcome = device.last_outcome().unwrap();
        assert_eq!(outcome.rejection(), Some(Rejection::Offline));
        assert!(outcome.retriable);
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_false_return() {
        let (transport, device) = device("Core300S");
        transport.push_ok(json!({"code": 0, "result": {"code": 0}}));
        assert!(!device.get_details().await.unwrap());
        assert_eq!(
            device.last_outcome().unwrap().rejection(),
            Some(Rejection::MalformedEnvelope)
        );
    }

    #[tokio::test]
    async fn transport_fault_propagates() {
        let (transport, device) = device("Core300S");
        transport.push_fault("connection reset");
        let err = device.turn_on().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!device.is_on());
    }

    #[tokio::test]
    async fn core200s_redirects_auto() {
        let (transport, device) = device("Core200S");
        transport.push_ok(bypass_ok(json!({})));
        assert!(device.set_auto_mode().await.unwrap());
        assert_eq!(device.mode(), "manual");
        assert_eq!(transport.last_call().unwrap().bypass_method(), Some("setLevel"));
    }

    #[tokio::test]
    async fn fan_convenience_modes() {
        let (transport, device) = device("LTF-F422S-KEU");
        transport.push_ok(bypass_ok(json!({})));
        assert!(device.set_sleep_mode().await.unwrap());
        assert_eq!(device.mode(), "advancedSleep");
        assert_eq!(device.level(), 0);

        transport.push_ok(bypass_ok(json!({})));
        assert!(device.change_level(7).await.unwrap());
        assert_eq!(device.mode(), "normal");
    }

    #[tokio::test]
    async fn argument_checks_precede_calls() {
        let (transport, humidifier) = device("LUH-A602S-WUS");
        assert!(humidifier.set_target_humidity(90).await.is_err());
        assert!(!humidifier.set_warm_mist_level(9).await.unwrap());
        assert_eq!(transport.call_count(), 0);

        let (transport, purifier) = device("LAP-V102S-WUS");
        let err = purifier
            .set_auto_preference(AutoPreference::new("turbo", 400))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidAutoPreference(_))));
        assert!(!purifier.set_timer(0, TimerAction::Off).await.unwrap());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_type_gets_fallback_profile() {
        let (transport, device) = device("XYZ-UNKNOWN");
        assert!(device.profile().is_fallback());
        assert!(device.set_display(true).await.unwrap_err().is_feature_unsupported());
        for result in [device.turn_on().await, device.get_details().await] {
            assert!(matches!(
                result,
                Err(Error::Device(DeviceError::OperationUnavailable { .. }))
            ));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn snapshot_serializes() {
        let (_, device) = device("Core300S");
        let json: Value = serde_json::from_str(&device.to_json().unwrap()).unwrap();
        assert_eq!(json["model"], "Core300S");
        assert_eq!(json["info"]["cid"], "cid-Core300S");
        assert_eq!(json["state"]["connectivity"], "online");
    }

    #[tokio::test(start_paused = true)]
    async fn vital_write_is_reconciled() {
        let transport = Arc::new(MockTransport::new());
        let device = Device::new(
            Arc::clone(&transport),
            DeviceInfo::new("cid-v", "LAP-V102S-WUS"),
        );

        transport.push_ok(json!({"code": 0, "result": {"code": -1, "result": {}}}));
        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {
            "powerSwitch": 1, "workMode": "auto", "fanSpeedLevel": 2
        }}}));

        assert!(device.set_mode("manual").await.unwrap());
        assert_eq!(device.mode(), "manual");
        assert_eq!(transport.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        tokio::task::yield_now().await;

        assert_eq!(transport.call_count(), 2);
        assert_eq!(device.mode(), "auto");
        assert_eq!(device.level(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_fetch_supersedes_reconciliation() {
        let transport = Arc::new(MockTransport::new());
        let device = Device::new(
            Arc::clone(&transport),
            DeviceInfo::new("cid-v", "LAP-V102S-WUS"),
        );
        let details = json!({"code": 0, "result": {"code": 0, "result": {"powerSwitch": 1}}});

        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {}}}));
        transport.push_ok(details);
        assert!(device.turn_on().await.unwrap());
        assert!(device.get_details().await.unwrap());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn each_vital_write_gets_its_own_refresh() {
        let transport = Arc::new(MockTransport::new());
        let device = Device::new(
            Arc::clone(&transport),
            DeviceInfo::new("cid-v", "LAP-V102S-WUS"),
        );

        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {}}}));
        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {}}}));
        // The first refresh lands before the mode change has converged.
        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {
            "powerSwitch": 1, "workMode": "auto", "fanSpeedLevel": 1
        }}}));
        transport.push_ok(json!({"code": 0, "result": {"code": 0, "result": {
            "powerSwitch": 1, "workMode": "manual", "fanSpeedLevel": 1
        }}}));

        assert!(device.turn_on().await.unwrap());
        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert!(device.set_mode("manual").await.unwrap());

        tokio::time::sleep(Duration::from_secs(10)).await;

        let methods: Vec<_> = transport
            .calls()
            .iter()
            .map(|c| c.bypass_method().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            methods,
            ["setSwitch", "setPurifierMode", "getPurifierStatus", "getPurifierStatus"]
        );
        assert_eq!(device.mode(), "manual");
    }
}
