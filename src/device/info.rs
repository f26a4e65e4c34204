// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity from the account's device listing.

use serde::{Deserialize, Serialize};

use crate::types::Connectivity;

/// Identity of one device as reported by the vendor's device listing.
///
/// Fields are read-only inputs: the device type selects the capability
/// profile, the rest is echoed back in request bodies.
///
/// # Examples
///
/// ```
/// use vesync_lib::device::DeviceInfo;
///
/// let json = r#"{
///     "cid": "vsaq1234", "uuid": "a-b-c", "deviceName": "Bedroom",
///     "deviceType": "Core300S", "configModule": "WFON_AP_Core300S_US",
///     "deviceRegion": "US", "connectionStatus": "online", "subDeviceNo": null
/// }"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.device_type, "Core300S");
/// assert!(info.connectivity().is_online());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    /// Cloud id; unique per device in an account.
    pub cid: String,
    /// Device uuid, used by legacy endpoints.
    pub uuid: String,
    /// User-assigned name.
    pub device_name: String,
    /// Vendor model identifier, e.g. `"LAP-C401S-WUSR"`.
    pub device_type: String,
    /// Firmware configuration module.
    pub config_module: String,
    /// Cloud region, e.g. `"US"` or `"EU"`.
    pub device_region: String,
    /// `"online"` or `"offline"` at listing time.
    pub connection_status: String,
    /// Outlet index for multi-outlet devices.
    pub sub_device_no: Option<u32>,
}

impl DeviceInfo {
    /// Creates an identity with the given cid and device type.
    #[must_use]
    pub fn new(cid: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            device_type: device_type.into(),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Returns the connectivity reported by the listing.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        Connectivity::from_status(&self.connection_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let info: DeviceInfo = serde_json::from_str(r#"{"cid": "x", "deviceType": "Dual200S"}"#).unwrap();
        assert_eq!(info.cid, "x");
        assert_eq!(info.uuid, "");
        assert_eq!(info.sub_device_no, None);
        assert_eq!(info.connectivity(), Connectivity::Offline);
    }

    #[test]
    fn new_sets_identity() {
        let info = DeviceInfo::new("c1", "Core200S").with_name("Office");
        assert_eq!(info.device_name, "Office");
        assert_eq!(info.device_type, "Core200S");
    }
}
