// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vital-quirk adapter for Vital/Everest purifiers, Superior humidifiers
//! and tower fans.
//!
//! Requests use the bypass-v2 envelope with camelCase data and `0`/`1`
//! switches. Writes are applied optimistically; the device reconciles the
//! state afterwards.

use serde_json::{Value, json};

use crate::capabilities::{Family, Variant};
use crate::error::{DeviceError, ParseError};
use crate::protocol::ApiRequest;
use crate::response::bypass::TimerCreated;
use crate::response::payload;
use crate::response::vital::{
    VitalFanStatus, VitalHumidifierStatus, VitalPurifierStatus, VitalTimerList,
};
use crate::state::{StateChange, Timer};
use crate::types::{AirQuality, AutoPreference, Connectivity, PowerStatus, TimerAction};

use super::bypass::envelope;
use super::{
    AdapterContext, Operation, level_change, mode_change, parse_payload, switch, timer_from_remain,
};

/// Wire name of humidifier auto mode.
const AUTO_PRO: &str = "autoPro";

fn humidifier_mode_to_wire(mode: &str) -> &str {
    if mode == "auto" { AUTO_PRO } else { mode }
}

fn humidifier_mode_from_wire(mode: String) -> String {
    if mode == AUTO_PRO { "auto".to_string() } else { mode }
}

pub(super) fn prepare(ctx: &AdapterContext<'_>, op: &Operation) -> Result<ApiRequest, DeviceError> {
    let family = ctx.profile.family;

    let (method, data) = match (op, family) {
        (Operation::Details, Family::AirPurifier) => ("getPurifierStatus", json!({})),
        (Operation::Details, Family::Humidifier) => ("getHumidifierStatus", json!({})),
        (Operation::Details, Family::Fan) => ("getTowerFanStatus", json!({})),
        (Operation::Power(power), _) => (
            "setSwitch",
            json!({"powerSwitch": power.as_switch(), "switchIdx": 0}),
        ),
        (Operation::Mode(mode), Family::AirPurifier) => {
            ("setPurifierMode", json!({"workMode": mode}))
        }
        (Operation::Mode(mode), Family::Humidifier) => (
            "setHumidityMode",
            json!({"workMode": humidifier_mode_to_wire(mode)}),
        ),
        (Operation::Mode(mode), Family::Fan) => ("setTowerFanMode", json!({"workMode": mode})),
        (Operation::Level(level), Family::Humidifier) => (
            "setVirtualLevel",
            json!({"levelIdx": 0, "virtualLevel": level, "levelType": "mist"}),
        ),
        (Operation::Level(level), Family::AirPurifier | Family::Fan) => (
            "setLevel",
            json!({"levelIdx": 0, "manualSpeedLevel": level, "levelType": "wind"}),
        ),
        (Operation::Display(on), _) => ("setDisplay", json!({"screenSwitch": switch(*on)})),
        (Operation::ChildLock(on), _) => {
            ("setChildLock", json!({"childLockSwitch": switch(*on)}))
        }
        (Operation::LightDetection(on), _) => (
            "setLightDetection",
            json!({"lightDetectionSwitch": switch(*on)}),
        ),
        (Operation::AutoPreference(preference), _) => (
            "setAutoPreference",
            json!({
                "autoPreferenceType": preference.kind,
                "roomSize": preference.room_size,
            }),
        ),
        (Operation::Oscillation(on), Family::Fan) => (
            "setOscillationSwitch",
            json!({"oscillationSwitch": switch(*on)}),
        ),
        (Operation::TargetHumidity(target), Family::Humidifier) => (
            "setTargetHumidity",
            json!({"targetHumidity": target.value()}),
        ),
        (Operation::SetTimer { seconds, action }, _) => (
            "addTimerV2",
            json!({
                "enabled": true,
                "startAct": [{"type": "powerSwitch", "num": 0, "act": action.as_switch()}],
                "tmgEvt": {"clkSec": seconds},
                "type": 1,
                "subDeviceNo": 0,
                "repeat": 0,
            }),
        ),
        (Operation::ClearTimer { id }, _) => ("delTimerV2", json!({"id": id, "subDeviceNo": 0})),
        (Operation::GetTimer, _) => ("getTimerV2", json!({})),
        _ => return Err(ctx.unavailable(op)),
    };
    Ok(envelope(Variant::VitalQuirk, ctx, method, data))
}

pub(super) fn interpret(
    ctx: &AdapterContext<'_>,
    op: &Operation,
    response: &Value,
) -> Result<StateChange, ParseError> {
    let payload = payload(response, Variant::VitalQuirk);
    let change = match op {
        Operation::Details => match ctx.profile.family {
            Family::Humidifier => humidifier_details(ctx, parse_payload(payload)?),
            Family::Fan => fan_details(ctx, parse_payload(payload)?),
            Family::AirPurifier | Family::Unknown => purifier_details(ctx, parse_payload(payload)?),
        },
        Operation::Power(power) => StateChange::Power(*power),
        Operation::Mode(mode) => mode_change(ctx, mode),
        Operation::Level(level) => level_change(ctx, *level),
        Operation::Display(on) => StateChange::Display(*on),
        Operation::ChildLock(on) => StateChange::ChildLock(*on),
        Operation::LightDetection(on) => StateChange::LightDetection(*on),
        Operation::AutoPreference(preference) => StateChange::AutoPreference(preference.clone()),
        Operation::Oscillation(on) => StateChange::Oscillation(*on),
        Operation::TargetHumidity(target) => StateChange::TargetHumidity(target.value()),
        Operation::SetTimer { seconds, action } => {
            let created: TimerCreated = parse_payload(payload)?;
            StateChange::Timer(Some(Timer::new(Some(created.id), *action, *seconds, *seconds)))
        }
        Operation::ClearTimer { .. } => StateChange::Timer(None),
        Operation::GetTimer => {
            let list: VitalTimerList = parse_payload(payload)?;
            let timer = list
                .timers
                .unwrap_or_default()
                .into_iter()
                .find(|t| t.enabled)
                .map(|t| {
                    let action = match t.start_act.first().map(|a| a.act) {
                        Some(1) => TimerAction::On,
                        _ => TimerAction::Off,
                    };
                    let seconds = t.tmg_evt.map_or(0, |e| e.clk_sec);
                    Timer::new(Some(t.id), action, seconds, seconds)
                });
            StateChange::Timer(timer)
        }
        Operation::NightLight(_)
        | Operation::NightLightBrightness(_)
        | Operation::WarmMistLevel(_) => {
            return Err(ParseError::UnexpectedFormat(format!(
                "no vital response for {op}"
            )));
        }
    };
    Ok(change)
}

fn on(switch: Option<u8>) -> Option<bool> {
    switch.map(|s| s != 0)
}

fn common(
    ctx: &AdapterContext<'_>,
    extra: serde_json::Map<String, Value>,
    power: Option<u8>,
    screen: Option<u8>,
    timer_remain: Option<u32>,
) -> Vec<StateChange> {
    let mut changes = vec![
        StateChange::Extra(extra),
        StateChange::Connectivity(Connectivity::Online),
    ];
    if let Some(power) = on(power) {
        changes.push(StateChange::Power(PowerStatus::from(power)));
    }
    if let Some(display) = on(screen) {
        changes.push(StateChange::Display(display));
    }
    if let Some(timer) = timer_from_remain(ctx, timer_remain) {
        changes.push(timer);
    }
    changes
}

fn purifier_details(ctx: &AdapterContext<'_>, status: VitalPurifierStatus) -> StateChange {
    let mut changes = common(
        ctx,
        status.extra,
        status.power_switch,
        status.screen_switch,
        status.timer_remain,
    );
    if let Some(mode) = status.work_mode {
        changes.push(StateChange::Mode(mode));
    }
    if let Some(level) = status.fan_speed_level.or(status.manual_speed_level) {
        changes.push(StateChange::Level(level));
    }
    if let Some(filter) = status.filter_life_percent {
        changes.push(StateChange::FilterLife(filter));
    }
    if status.aq_level.is_some() || status.pm25.is_some() {
        changes.push(StateChange::AirQuality {
            level: status.aq_level.and_then(AirQuality::new),
            pm25: status.pm25,
        });
    }
    if let Some(lock) = on(status.child_lock_switch) {
        changes.push(StateChange::ChildLock(lock));
    }
    if let Some(detection) = on(status.light_detection_switch) {
        changes.push(StateChange::LightDetection(detection));
    }
    if let Some(preference) = status.auto_preference {
        changes.push(StateChange::AutoPreference(AutoPreference::new(
            preference.auto_preference_type,
            preference.room_size,
        )));
    }
    StateChange::Batch(changes)
}

fn humidifier_details(ctx: &AdapterContext<'_>, status: VitalHumidifierStatus) -> StateChange {
    let mut changes = common(
        ctx,
        status.extra,
        status.power_switch,
        status.screen_switch,
        status.timer_remain,
    );
    if let Some(mode) = status.work_mode {
        changes.push(StateChange::Mode(humidifier_mode_from_wire(mode)));
    }
    if let Some(level) = status.virtual_level {
        changes.push(StateChange::Level(level));
    }
    if let Some(humidity) = status.humidity {
        changes.push(StateChange::Humidity(humidity));
    }
    if let Some(target) = status.target_humidity {
        changes.push(StateChange::TargetHumidity(target));
    }
    if let Some(lacks) = on(status.water_lacks_state) {
        changes.push(StateChange::WaterLacks(lacks));
    }
    if let Some(lock) = on(status.child_lock_switch) {
        changes.push(StateChange::ChildLock(lock));
    }
    StateChange::Batch(changes)
}

fn fan_details(ctx: &AdapterContext<'_>, status: VitalFanStatus) -> StateChange {
    let mut changes = common(
        ctx,
        status.extra,
        status.power_switch,
        status.screen_switch,
        status.timer_remain,
    );
    if let Some(mode) = status.work_mode {
        changes.push(StateChange::Mode(mode));
    }
    if let Some(level) = status.fan_speed_level.or(status.manual_speed_level) {
        changes.push(StateChange::Level(level));
    }
    if let Some(oscillation) = on(status.oscillation_switch) {
        changes.push(StateChange::Oscillation(oscillation));
    }
    StateChange::Batch(changes)
}
