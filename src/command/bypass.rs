// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bypass-v1/v2 adapter for Core purifiers and Classic/Dual/LV humidifiers.

use serde_json::{Value, json};

use crate::capabilities::{Family, Variant};
use crate::error::{DeviceError, ParseError};
use crate::protocol::ApiRequest;
use crate::response::bypass::{
    BypassHumidifierStatus, BypassPurifierStatus, TimerCreated, TimerList,
};
use crate::response::payload;
use crate::state::{StateChange, Timer};
use crate::types::{AirQuality, Connectivity, NightLight, PowerStatus, TimerAction};

use super::{
    AdapterContext, Operation, level_change, manual_level, mode_change, parse_payload,
    timer_from_remain,
};

/// Wraps a method call in the envelope of the given bypass variant.
pub(super) fn envelope(
    variant: Variant,
    ctx: &AdapterContext<'_>,
    method: &str,
    data: Value,
) -> ApiRequest {
    let info = ctx.info;
    if variant == Variant::BypassV1 {
        let mut body = ctx.session.base_body("bypass");
        body.insert("cid".to_string(), json!(info.cid));
        body.insert("configModule".to_string(), json!(info.config_module));
        body.insert("uuid".to_string(), json!(info.uuid));
        body.insert("jsonCmd".to_string(), json!({"method": method, "data": data}));
        return ApiRequest::post("/cloud/v1/deviceManaged/bypass", Value::Object(body));
    }

    let mut body = ctx.session.base_body("bypassV2");
    body.insert("cid".to_string(), json!(info.cid));
    body.insert("configModule".to_string(), json!(info.config_module));
    body.insert("debugMode".to_string(), json!(false));
    body.insert("deviceRegion".to_string(), json!(info.device_region));
    body.insert(
        "payload".to_string(),
        json!({"method": method, "source": "APP", "data": data}),
    );
    ApiRequest::post("/cloud/v2/deviceManaged/bypassV2", Value::Object(body))
}

pub(super) fn prepare(
    variant: Variant,
    ctx: &AdapterContext<'_>,
    op: &Operation,
) -> Result<ApiRequest, DeviceError> {
    let family = ctx.profile.family;
    let humidifier = family == Family::Humidifier;

    let (method, data) = match op {
        Operation::Details => match family {
            Family::AirPurifier => ("getPurifierStatus", json!({})),
            Family::Humidifier => ("getHumidifierStatus", json!({})),
            Family::Fan | Family::Unknown => return Err(ctx.unavailable(op)),
        },
        Operation::Power(power) => ("setSwitch", json!({"enabled": power.is_on(), "id": 0})),
        Operation::Mode(mode) if humidifier => ("setHumidityMode", json!({"mode": mode})),
        Operation::Mode(mode) if mode == "manual" => (
            "setLevel",
            json!({"id": 0, "level": manual_level(ctx), "type": "wind"}),
        ),
        Operation::Mode(mode) => ("setPurifierMode", json!({"mode": mode})),
        Operation::Level(level) if humidifier => (
            "setVirtualLevel",
            json!({"id": 0, "level": level, "type": "mist"}),
        ),
        Operation::Level(level) => ("setLevel", json!({"id": 0, "level": level, "type": "wind"})),
        Operation::Display(on) => ("setDisplay", json!({"state": on})),
        Operation::ChildLock(on) => ("setChildLock", json!({"child_lock": on})),
        Operation::NightLight(setting) => ("setNightLight", json!({"night_light": setting.as_str()})),
        Operation::NightLightBrightness(brightness) => (
            "setNightLightBrightness",
            json!({"night_light_brightness": brightness.value()}),
        ),
        Operation::TargetHumidity(target) => (
            "setTargetHumidity",
            json!({"target_humidity": target.value()}),
        ),
        Operation::WarmMistLevel(level) => (
            "setLevel",
            json!({"id": 0, "level": level, "type": "warm"}),
        ),
        Operation::SetTimer { seconds, action } => (
            "addTimer",
            json!({"action": action.as_str(), "total": seconds}),
        ),
        Operation::ClearTimer { id } => ("delTimer", json!({"id": id})),
        Operation::GetTimer => ("getTimer", json!({})),
        Operation::Oscillation(_) | Operation::AutoPreference(_) | Operation::LightDetection(_) => {
            return Err(ctx.unavailable(op));
        }
    };
    Ok(envelope(variant, ctx, method, data))
}

pub(super) fn interpret(
    variant: Variant,
    ctx: &AdapterContext<'_>,
    op: &Operation,
    response: &Value,
) -> Result<StateChange, ParseError> {
    let change = match op {
        Operation::Details => {
            let payload = payload(response, variant);
            if ctx.profile.family == Family::Humidifier {
                humidifier_details(parse_payload(payload)?)
            } else {
                purifier_details(ctx, parse_payload(payload)?)
            }
        }
        Operation::Power(power) => StateChange::Power(*power),
        Operation::Mode(mode) => mode_change(ctx, mode),
        Operation::Level(level) => level_change(ctx, *level),
        Operation::Display(on) => StateChange::Display(*on),
        Operation::ChildLock(on) => StateChange::ChildLock(*on),
        Operation::NightLight(setting) => StateChange::NightLight(*setting),
        Operation::NightLightBrightness(b) => StateChange::NightLightBrightness(b.value()),
        Operation::TargetHumidity(t) => StateChange::TargetHumidity(t.value()),
        Operation::WarmMistLevel(level) => StateChange::WarmMistLevel(*level),
        Operation::SetTimer { seconds, action } => {
            let created: TimerCreated = parse_payload(payload(response, variant))?;
            StateChange::Timer(Some(Timer::new(Some(created.id), *action, *seconds, *seconds)))
        }
        Operation::ClearTimer { .. } => StateChange::Timer(None),
        Operation::GetTimer => {
            let list: TimerList = parse_payload(payload(response, variant))?;
            let timer = list.timers.unwrap_or_default().into_iter().next().map(|t| {
                let action = t
                    .action
                    .as_deref()
                    .and_then(|a| a.parse::<TimerAction>().ok())
                    .unwrap_or_default();
                Timer::new(Some(t.id), action, t.total.max(t.remain), t.remain)
            });
            StateChange::Timer(timer)
        }
        Operation::Oscillation(_) | Operation::AutoPreference(_) | Operation::LightDetection(_) => {
            return Err(ParseError::UnexpectedFormat(format!(
                "no bypass response for {op}"
            )));
        }
    };
    Ok(change)
}

fn purifier_details(ctx: &AdapterContext<'_>, status: BypassPurifierStatus) -> StateChange {
    let mut changes = vec![
        StateChange::Extra(status.extra),
        StateChange::Connectivity(Connectivity::Online),
        StateChange::Level(status.level.unwrap_or(0)),
    ];
    if let Some(enabled) = status.enabled {
        changes.push(StateChange::Power(PowerStatus::from(enabled)));
    }
    if let Some(mode) = status.mode {
        changes.push(StateChange::Mode(mode));
    }
    if let Some(display) = status.display {
        changes.push(StateChange::Display(display));
    }
    if let Some(lock) = status.child_lock {
        changes.push(StateChange::ChildLock(lock));
    }
    if let Some(filter) = status.filter_life {
        changes.push(StateChange::FilterLife(filter));
    }
    if status.air_quality.is_some() || status.air_quality_value.is_some() {
        changes.push(StateChange::AirQuality {
            level: status.air_quality.and_then(AirQuality::new),
            pm25: status.air_quality_value,
        });
    }
    if let Some(night_light) = status
        .night_light
        .as_deref()
        .and_then(|n| n.parse::<NightLight>().ok())
    {
        changes.push(StateChange::NightLight(night_light));
    }
    if let Some(timer) = timer_from_remain(ctx, status.extension.and_then(|e| e.timer_remain)) {
        changes.push(timer);
    }
    StateChange::Batch(changes)
}

fn humidifier_details(status: BypassHumidifierStatus) -> StateChange {
    let mut changes = vec![
        StateChange::Extra(status.extra),
        StateChange::Connectivity(Connectivity::Online),
        StateChange::Level(status.mist_virtual_level.unwrap_or(0)),
    ];
    if let Some(enabled) = status.enabled {
        changes.push(StateChange::Power(PowerStatus::from(enabled)));
    }
    if let Some(mode) = status.mode {
        changes.push(StateChange::Mode(mode));
    }
    if let Some(humidity) = status.humidity {
        changes.push(StateChange::Humidity(humidity));
    }
    if let Some(lacks) = status.water_lacks {
        changes.push(StateChange::WaterLacks(lacks));
    }
    if let Some(display) = status.display {
        changes.push(StateChange::Display(display));
    }
    if let Some(brightness) = status.night_light_brightness {
        changes.push(StateChange::NightLightBrightness(brightness));
    }
    if let Some(target) = status.configuration.and_then(|c| c.auto_target_humidity) {
        changes.push(StateChange::TargetHumidity(target));
    }
    match (status.warm_enabled, status.warm_level) {
        (Some(false), _) => changes.push(StateChange::WarmMistLevel(0)),
        (_, Some(level)) => changes.push(StateChange::WarmMistLevel(level)),
        _ => {}
    }
    StateChange::Batch(changes)
}
