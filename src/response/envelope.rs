// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envelope classification.
//!
//! A vendor response carries up to three success indicators: the HTTP
//! status, the body-level `code`, and for bypass variants a nested
//! `result.code`. Which of them must agree depends on the [`Variant`] and,
//! for the vital-quirk variant, on the kind of call.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::capabilities::Variant;

/// A vendor error code found in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VendorCode(pub i64);

impl VendorCode {
    /// The success code.
    pub const OK: Self = Self(0);

    /// The device is unreachable from the cloud.
    pub const DEVICE_OFFLINE: Self = Self(-11_300_030);

    /// The device firmware does not implement the requested method.
    pub const FEATURE_NOT_SUPPORTED: Self = Self(-11_000_086);

    /// Returns the raw code.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` for the two codes that denote a definite refusal
    /// rather than a transient or stale failure.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        self.0 == Self::DEVICE_OFFLINE.0 || self.0 == Self::FEATURE_NOT_SUPPORTED.0
    }
}

impl fmt::Display for VendorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a call will use the response, which decides how strictly it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// A status read. Vital-quirk reads ignore the inner code when a
    /// status payload is present.
    Read,
    /// A write held to every envelope layer.
    Write,
    /// A vital-quirk write accepted on a clean outer layer alone.
    TolerantWrite,
}

/// Why a call was not successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rejection {
    /// Non-200 transport status without a vendor code.
    HttpStatus(u16),
    /// The device does not implement the method.
    FeatureUnsupported,
    /// The device is offline.
    Offline,
    /// Any other vendor code.
    Vendor(i64),
    /// A required envelope layer is missing.
    MalformedEnvelope,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "HTTP status {status}"),
            Self::FeatureUnsupported => f.write_str("feature not supported"),
            Self::Offline => f.write_str("device offline"),
            Self::Vendor(code) => write!(f, "vendor code {code}"),
            Self::MalformedEnvelope => f.write_str("malformed envelope"),
        }
    }
}

/// Result of classifying a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// `true` if every required layer reported success.
    pub success: bool,
    /// The first non-zero vendor code found, if any.
    pub vendor_code: Option<VendorCode>,
    /// `true` if repeating the call later might succeed.
    pub retriable: bool,
    /// Transport status of the response.
    pub status: u16,
    /// `true` if a non-zero inner code was tolerated.
    pub inner_code_ignored: bool,
    /// Vendor message accompanying the failing code, if any.
    pub message: Option<String>,
}

impl Outcome {
    /// A plain success.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            vendor_code: None,
            retriable: false,
            status: 200,
            inner_code_ignored: false,
            message: None,
        }
    }

    /// A failure with the given status and vendor code.
    #[must_use]
    pub fn failure(status: u16, code: Option<i64>) -> Self {
        let vendor_code = code.map(VendorCode);
        let retriable = status >= 500
            || status == 429
            || vendor_code == Some(VendorCode::DEVICE_OFFLINE);
        Self {
            success: false,
            vendor_code,
            retriable,
            status,
            inner_code_ignored: false,
            message: None,
        }
    }

    fn tolerated(inner: Option<i64>) -> Self {
        Self {
            inner_code_ignored: inner != Some(0),
            ..Self::ok()
        }
    }

    fn with_message(mut self, message: Option<&str>) -> Self {
        self.message = message.map(str::to_string);
        self
    }

    /// Returns the reason for a failure, or `None` on success.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        if self.success {
            return None;
        }
        Some(match self.vendor_code {
            Some(VendorCode::FEATURE_NOT_SUPPORTED) => Rejection::FeatureUnsupported,
            Some(VendorCode::DEVICE_OFFLINE) => Rejection::Offline,
            Some(VendorCode(code)) => Rejection::Vendor(code),
            None if self.status != 200 => Rejection::HttpStatus(self.status),
            None => Rejection::MalformedEnvelope,
        })
    }

    /// Returns `true` if the vendor reported the feature as unsupported.
    #[must_use]
    pub fn is_feature_unsupported(&self) -> bool {
        self.rejection() == Some(Rejection::FeatureUnsupported)
    }

    /// Returns `true` if the vendor reported the device as offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.rejection() == Some(Rejection::Offline)
    }
}

/// Classifies a status-read response.
///
/// Equivalent to [`classify_access`] with [`Access::Read`].
#[must_use]
pub fn classify(status: u16, body: &Value, variant: Variant) -> Outcome {
    classify_access(status, body, variant, Access::Read)
}

/// Classifies a response for the given variant and access kind.
///
/// - legacy-flat: HTTP 200 and `code == 0`; a body without `code` is
///   judged on the HTTP status alone
/// - bypass-v1/v2: HTTP 200, `code == 0` and `result.code == 0`
/// - vital-quirk: as bypass, except that a read with a non-empty
///   `result.result` object, or a [`Access::TolerantWrite`] with a
///   `result` object, only needs the outer layer to be clean
///
/// Codes may be numbers or numeric strings. A missing required layer is a
/// failure without a vendor code.
///
/// # Examples
///
/// ```
/// use vesync_lib::capabilities::Variant;
/// use vesync_lib::response::classify;
/// use serde_json::json;
///
/// let body = json!({"code": 0, "result": {"code": -1, "result": {"powerSwitch": 1}}});
/// assert!(classify(200, &body, Variant::VitalQuirk).success);
/// assert!(!classify(200, &body, Variant::BypassV2).success);
/// ```
#[must_use]
pub fn classify_access(status: u16, body: &Value, variant: Variant, access: Access) -> Outcome {
    if variant == Variant::LegacyFlat {
        return classify_legacy(status, body);
    }

    let outer = code_of(body);
    let message = message_of(body);
    if status != 200 {
        return Outcome::failure(status, outer.filter(|c| *c != 0)).with_message(message);
    }
    match outer {
        None => return Outcome::failure(status, None),
        Some(0) => {}
        Some(code) => return Outcome::failure(status, Some(code)).with_message(message),
    }

    let Some(result) = body.get("result").filter(|r| r.is_object()) else {
        return Outcome::failure(status, None);
    };
    let inner = code_of(result);

    if variant == Variant::VitalQuirk && inner != Some(0) {
        let sentinel = inner.is_some_and(|c| VendorCode(c).is_sentinel());
        let tolerated = match access {
            Access::Read => result
                .get("result")
                .and_then(Value::as_object)
                .is_some_and(|payload| !payload.is_empty()),
            Access::TolerantWrite => !sentinel,
            Access::Write => false,
        };
        if tolerated {
            return Outcome::tolerated(inner);
        }
    }

    match inner {
        Some(0) => Outcome::ok(),
        code => Outcome::failure(status, code).with_message(message_of(result)),
    }
}

fn classify_legacy(status: u16, body: &Value) -> Outcome {
    let code = code_of(body);
    let message = message_of(body);
    if status != 200 {
        return Outcome::failure(status, code.filter(|c| *c != 0)).with_message(message);
    }
    match code {
        None | Some(0) => Outcome::ok(),
        Some(code) => Outcome::failure(status, Some(code)).with_message(message),
    }
}

/// Returns the status payload of a successful response.
///
/// Legacy bodies carry their fields at the top level; bypass bodies nest
/// them under `result.result`.
#[must_use]
pub fn payload(body: &Value, variant: Variant) -> Option<&Value> {
    if variant == Variant::LegacyFlat {
        return body.is_object().then_some(body);
    }
    body.get("result")
        .and_then(|r| r.get("result"))
        .filter(|p| !p.is_null())
}

fn code_of(value: &Value) -> Option<i64> {
    match value.get("code")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn message_of(value: &Value) -> Option<&str> {
    value.get("msg").and_then(Value::as_str)
}
