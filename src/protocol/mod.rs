// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport to the vendor cloud.
//!
//! Devices never talk HTTP themselves. They build an [`ApiRequest`], hand
//! it to a [`Transport`], and classify the returned [`ApiResponse`].
//!
//! # Transports
//!
//! - [`HttpTransport`]: reqwest-based client for the real cloud API
//! - [`MockTransport`]: records calls and replays queued responses

#[cfg(feature = "http")]
mod http;
mod mock;
mod session;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};
pub use mock::MockTransport;
pub use session::Session;

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::error::TransportError;

/// HTTP method of a vendor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the vendor cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path below the API base URL, starting with `/`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// JSON body.
    pub body: Value,
}

impl ApiRequest {
    /// Creates a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Post,
            body,
        }
    }

    /// Creates a `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Put,
            body,
        }
    }

    /// Returns the bypass method name (`payload.method` or
    /// `jsonCmd.method`), if this is a bypass request.
    #[must_use]
    pub fn bypass_method(&self) -> Option<&str> {
        self.body
            .pointer("/payload/method")
            .or_else(|| self.body.pointer("/jsonCmd/method"))
            .and_then(Value::as_str)
    }
}

/// A transport-level response: HTTP status plus parsed JSON body.
///
/// Bodies that are empty or not JSON are represented as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body.
    pub body: Value,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Creates a `200 OK` response.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }
}

/// Executes calls against the vendor cloud.
///
/// Implementations must report ordinary vendor errors (non-2xx statuses,
/// non-zero body codes) through [`ApiResponse`] and only return
/// [`TransportError`] for hard faults. Timeouts are the transport's
/// responsibility.
pub trait Transport: Send + Sync {
    /// Executes one call.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the call could not be completed.
    fn call(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;

    /// Returns the authenticated session used for request bodies.
    fn session(&self) -> &Session;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bypass_method_from_v2_payload() {
        let request = ApiRequest::put(
            "/cloud/v2/deviceManaged/bypassV2",
            json!({"payload": {"method": "setSwitch", "source": "APP", "data": {}}}),
        );
        assert_eq!(request.bypass_method(), Some("setSwitch"));
    }

    #[test]
    fn bypass_method_from_v1_json_cmd() {
        let request = ApiRequest::post(
            "/cloud/v1/deviceManaged/bypass",
            json!({"jsonCmd": {"method": "getHumidifierStatus", "data": {}}}),
        );
        assert_eq!(request.bypass_method(), Some("getHumidifierStatus"));
    }

    #[test]
    fn bypass_method_absent_for_legacy() {
        let request = ApiRequest::put(
            "/131airPurifier/v1/device/deviceStatus",
            json!({"uuid": "abc", "status": "on"}),
        );
        assert_eq!(request.bypass_method(), None);
        assert_eq!(request.method.to_string(), "PUT");
    }
}
