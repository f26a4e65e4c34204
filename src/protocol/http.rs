// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the vendor cloud.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::TransportError;
use crate::protocol::{ApiRequest, ApiResponse, HttpMethod, Session, Transport};

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the HTTP transport.
///
/// # Examples
///
/// ```
/// use vesync_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_base_url("https://smartapi.vesync.eu")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://smartapi.vesync.eu");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://smartapi.vesync.com";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API base URL. A trailing `/` is removed.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpTransport` for the given session.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not HTTP(S) or the HTTP client
    /// cannot be created.
    pub fn into_transport(self, session: Session) -> Result<HttpTransport, TransportError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TransportError::InvalidAddress(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(TransportError::Http)?;

        Ok(HttpTransport {
            client,
            config: self,
            session,
        })
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// reqwest-based [`Transport`].
///
/// Non-2xx statuses are returned as ordinary responses so the envelope
/// validator can classify them. Only connection failures, timeouts and
/// `401 Unauthorized` are errors.
///
/// # Examples
///
/// ```no_run
/// use vesync_lib::protocol::{HttpConfig, Session};
///
/// # fn example() -> vesync_lib::Result<()> {
/// let transport = HttpConfig::new().into_transport(Session::new("1234", "token"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpConfig,
    session: Session,
}

impl HttpTransport {
    /// Creates a transport with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(session: Session) -> Result<Self, TransportError> {
        HttpConfig::new().into_transport(session)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn map_send_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            // Saturate rather than truncate absurd timeouts.
            let millis = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
            TransportError::Timeout(millis)
        } else if error.is_connect() {
            TransportError::ConnectionFailed(error.to_string())
        } else {
            TransportError::Http(error)
        }
    }
}

impl Transport for HttpTransport {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);

        tracing::debug!(method = %request.method, url = %url, body = %request.body, "Sending API request");

        let mut builder = match request.method {
            HttpMethod::Post => self.client.post(&url).json(&request.body),
            HttpMethod::Put => self.client.put(&url).json(&request.body),
        };
        for (name, value) in self.session.headers() {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::AuthenticationFailed);
        }

        let text = response.text().await.map_err(TransportError::Http)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Response body is not JSON");
                Value::Null
            })
        };

        tracing::debug!(status = status.as_u16(), body = %body, "Received API response");

        Ok(ApiResponse::new(status.as_u16(), body))
    }

    fn session(&self) -> &Session {
        &self.session
    }
}
