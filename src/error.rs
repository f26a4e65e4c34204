// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `vesync_lib` library.
//!
//! Only two kinds of failure are raised as errors:
//!
//! - transport faults, propagated unchanged from the [`Transport`](crate::protocol::Transport)
//! - capability violations, i.e. the caller asked for a value or a feature
//!   the device profile does not support
//!
//! A vendor refusing a well-formed command is *not* an error: device
//! commands return `Ok(false)` and the classified
//! [`Outcome`](crate::response::Outcome) is kept on the device.

use thiserror::Error;

use crate::capabilities::FeatureTag;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument value is not valid for this device.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The transport could not complete the call.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The device cannot perform the requested operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Device was not found in the fleet.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
}

impl Error {
    /// Returns `true` if this error is a feature-gate violation.
    #[must_use]
    pub fn is_feature_unsupported(&self) -> bool {
        matches!(self, Self::Device(DeviceError::FeatureUnsupported { .. }))
    }
}

/// Errors related to argument validation.
///
/// These are raised before any network call is placed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// The mode is not listed in the device profile.
    #[error("mode {mode:?} is not supported (supported: {supported:?})")]
    InvalidMode {
        /// The requested mode.
        mode: String,
        /// Modes listed by the device profile.
        supported: Vec<String>,
    },

    /// An invalid power status string was provided.
    #[error("invalid power status: {0}")]
    InvalidPowerStatus(String),

    /// An invalid night light setting was provided.
    #[error("invalid night light setting: {0}")]
    InvalidNightLight(String),

    /// The auto preference is not listed in the device profile.
    #[error("invalid auto preference: {0}")]
    InvalidAutoPreference(String),

    /// An invalid timer action was provided.
    #[error("invalid timer action: {0}")]
    InvalidTimerAction(String),
}

/// Errors raised by the transport collaborator.
///
/// Ordinary vendor errors (non-2xx status, non-zero body codes) are *not*
/// transport errors; they are reported through the response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the vendor cloud failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The session token was rejected.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing vendor responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device capabilities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device profile lacks the feature gating this operation.
    #[error("device does not support {feature}")]
    FeatureUnsupported {
        /// The missing feature.
        feature: FeatureTag,
    },

    /// The operation is not defined for this device family.
    #[error("operation {operation} is not available for {device_type}")]
    OperationUnavailable {
        /// Operation name.
        operation: &'static str,
        /// Device type identifier.
        device_type: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 30,
            max: 80,
            actual: 95,
        };
        assert_eq!(err.to_string(), "value 95 is out of range [30, 80]");
    }

    #[test]
    fn invalid_mode_lists_supported_modes() {
        let err = ValueError::InvalidMode {
            mode: "turbo".to_string(),
            supported: vec!["auto".to_string(), "manual".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"mode "turbo" is not supported (supported: ["auto", "manual"])"#
        );
    }

    #[test]
    fn feature_unsupported_display() {
        let err = DeviceError::FeatureUnsupported {
            feature: FeatureTag::ChildLock,
        };
        assert_eq!(err.to_string(), "device does not support child_lock");
    }

    #[test]
    fn error_is_feature_unsupported() {
        let err: Error = DeviceError::FeatureUnsupported {
            feature: FeatureTag::Oscillation,
        }
        .into();
        assert!(err.is_feature_unsupported());

        let err: Error = ValueError::InvalidPowerStatus("maybe".to_string()).into();
        assert!(!err.is_feature_unsupported());
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("result.result".to_string());
        assert_eq!(err.to_string(), "missing field in response: result.result");
    }
}
