// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated account session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// App version presented to the vendor cloud.
pub const APP_VERSION: &str = "2.8.6";
/// Phone brand presented to the vendor cloud.
pub const PHONE_BRAND: &str = "SM N9005";
/// Phone OS presented to the vendor cloud.
pub const PHONE_OS: &str = "Android";

/// Session fields obtained by logging in.
///
/// Authentication itself is out of scope: callers obtain `account_id` and
/// `token` from the vendor login endpoint and hand them over read-only.
///
/// # Examples
///
/// ```
/// use vesync_lib::protocol::Session;
///
/// let session = Session::new("1234567", "tk-abc").with_time_zone("Europe/Paris");
/// assert_eq!(session.time_zone(), "Europe/Paris");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "accountID")]
    account_id: String,
    token: String,
    #[serde(default = "default_time_zone")]
    time_zone: String,
    #[serde(default = "default_country_code")]
    country_code: String,
}

fn default_time_zone() -> String {
    Session::DEFAULT_TIME_ZONE.to_string()
}

fn default_country_code() -> String {
    Session::DEFAULT_COUNTRY_CODE.to_string()
}

impl Session {
    /// Default time zone.
    pub const DEFAULT_TIME_ZONE: &'static str = "America/New_York";
    /// Default user country code.
    pub const DEFAULT_COUNTRY_CODE: &'static str = "US";

    /// Creates a session for the given account and token.
    #[must_use]
    pub fn new(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: token.into(),
            time_zone: default_time_zone(),
            country_code: default_country_code(),
        }
    }

    /// Sets the time zone.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Sets the user country code.
    #[must_use]
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    /// Returns the account id.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the time zone.
    #[must_use]
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Returns the user country code.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Returns the HTTP headers every authenticated call carries.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("accept-language", "en".to_string()),
            ("accountId", self.account_id.clone()),
            ("appVersion", APP_VERSION.to_string()),
            ("content-type", "application/json".to_string()),
            ("tk", self.token.clone()),
            ("tz", self.time_zone.clone()),
        ]
    }

    /// Returns the body fields every authenticated call carries.
    ///
    /// `method` is the vendor's name for the call; a fresh `traceId` is
    /// generated each time.
    #[must_use]
    pub fn base_body(&self, method: &str) -> Map<String, Value> {
        let body = json!({
            "acceptLanguage": "en",
            "accountID": self.account_id,
            "appVersion": APP_VERSION,
            "method": method,
            "phoneBrand": PHONE_BRAND,
            "phoneOS": PHONE_OS,
            "timeZone": self.time_zone,
            "token": self.token,
            "traceId": uuid::Uuid::new_v4().simple().to_string(),
            "userCountryCode": self.country_code,
        });
        match body {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
