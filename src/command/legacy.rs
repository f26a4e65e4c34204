// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legacy-flat adapter: one REST path per operation, flat bodies.

use serde_json::{Map, Value, json};

use crate::capabilities::Variant;
use crate::error::{DeviceError, ParseError};
use crate::protocol::ApiRequest;
use crate::response::{legacy::LegacyDetails, payload};
use crate::state::StateChange;
use crate::types::{AirQuality, Connectivity, PowerStatus};

use super::{AdapterContext, Operation, level_change, manual_level, mode_change, parse_payload};

const BASE: &str = "/131airPurifier/v1/device";

fn body(ctx: &AdapterContext<'_>, method: &str, fields: Value) -> Value {
    let mut body = ctx.session.base_body(method);
    body.insert("uuid".to_string(), Value::String(ctx.info.uuid.clone()));
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    Value::Object(body)
}

pub(super) fn prepare(ctx: &AdapterContext<'_>, op: &Operation) -> Result<ApiRequest, DeviceError> {
    let request = match op {
        Operation::Details => ApiRequest::post(
            format!("{BASE}/deviceDetail"),
            body(ctx, "deviceDetail", json!({})),
        ),
        Operation::Power(power) => ApiRequest::put(
            format!("{BASE}/deviceStatus"),
            body(ctx, "deviceStatus", json!({"status": power.as_str()})),
        ),
        Operation::Mode(mode) => {
            let mut fields = Map::new();
            fields.insert("mode".to_string(), Value::String(mode.clone()));
            if mode == "manual" {
                fields.insert("level".to_string(), Value::from(manual_level(ctx)));
            }
            ApiRequest::put(
                format!("{BASE}/updateMode"),
                body(ctx, "updateMode", Value::Object(fields)),
            )
        }
        Operation::Level(level) => ApiRequest::put(
            format!("{BASE}/updateSpeed"),
            body(ctx, "updateSpeed", json!({"level": level})),
        ),
        Operation::Display(on) => ApiRequest::put(
            format!("{BASE}/updateScreen"),
            body(
                ctx,
                "updateScreen",
                json!({"status": PowerStatus::from(*on).as_str()}),
            ),
        ),
        _ => return Err(ctx.unavailable(op)),
    };
    Ok(request)
}

pub(super) fn interpret(
    ctx: &AdapterContext<'_>,
    op: &Operation,
    response: &Value,
) -> Result<StateChange, ParseError> {
    let change = match op {
        Operation::Details => {
            let details: LegacyDetails = parse_payload(payload(response, Variant::LegacyFlat))?;
            details_change(details)?
        }
        Operation::Power(power) => StateChange::Power(*power),
        Operation::Mode(mode) => mode_change(ctx, mode),
        Operation::Level(level) => level_change(ctx, *level),
        Operation::Display(on) => StateChange::Display(*on),
        _ => {
            return Err(ParseError::UnexpectedFormat(format!(
                "no legacy response for {op}"
            )));
        }
    };
    Ok(change)
}

fn details_change(details: LegacyDetails) -> Result<StateChange, ParseError> {
    let power = details
        .device_status
        .as_deref()
        .ok_or_else(|| ParseError::MissingField("deviceStatus".to_string()))?
        .parse::<PowerStatus>()
        .map_err(|e| ParseError::UnexpectedFormat(e.to_string()))?;

    let mut changes = vec![
        StateChange::Extra(details.extra),
        StateChange::Power(power),
        StateChange::Connectivity(
            details
                .connection_status
                .as_deref()
                .map_or(Connectivity::Online, Connectivity::from_status),
        ),
        StateChange::Level(details.level.unwrap_or(0)),
    ];
    if let Some(mode) = details.mode {
        changes.push(StateChange::Mode(mode));
    }
    if let Some(screen) = details.screen_status {
        changes.push(StateChange::Display(screen.eq_ignore_ascii_case("on")));
    }
    if let Some(percent) = details.filter_life.and_then(|f| f.percent) {
        changes.push(StateChange::FilterLife(percent));
    }
    if let Some(level) = details.air_quality.as_deref().and_then(AirQuality::from_label) {
        changes.push(StateChange::AirQuality {
            level: Some(level),
            pm25: None,
        });
    }
    Ok(StateChange::Batch(changes))
}
