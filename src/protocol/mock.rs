// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording transport for tests and harnesses.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
use crate::protocol::{ApiRequest, ApiResponse, Session, Transport};

/// A [`Transport`] that replays queued responses and records every call.
///
/// Responses are consumed in FIFO order. When the queue is empty, calls
/// fail with [`TransportError::ConnectionFailed`].
///
/// # Examples
///
/// ```
/// use vesync_lib::protocol::{ApiRequest, MockTransport, Transport};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::new();
/// transport.push_ok(json!({"code": 0}));
///
/// let response = transport
///     .call(&ApiRequest::post("/x", json!({})))
///     .await
///     .unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.call_count(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    session: Session,
    responses: Mutex<VecDeque<Result<ApiResponse, String>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a mock with a dummy session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(Session::new("mock-account", "mock-token"))
    }

    /// Creates a mock with the given session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response.
    pub fn push_response(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queues a `200 OK` response.
    pub fn push_ok(&self, body: Value) {
        self.push_response(200, body);
    }

    /// Queues a transport fault.
    pub fn push_fault(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Returns the number of queued responses not consumed yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }

    /// Returns a copy of every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<ApiRequest> {
        self.calls.lock().last().cloned()
    }

    fn next(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.lock().push(request.clone());
        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::ConnectionFailed(message)),
            None => Err(TransportError::ConnectionFailed(format!(
                "no response queued for {}",
                request.path
            ))),
        }
    }
}

impl Transport for MockTransport {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.next(request)
    }

    fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn replays_in_order_and_records() {
        let transport = MockTransport::new();
        transport.push_ok(json!({"n": 1}));
        transport.push_response(500, Value::Null);

        let first = transport
            .call(&ApiRequest::post("/a", json!({})))
            .await
            .unwrap();
        let second = transport
            .call(&ApiRequest::put("/b", json!({})))
            .await
            .unwrap();

        assert_eq!(first.body["n"], 1);
        assert_eq!(second.status, 500);
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.last_call().unwrap().path, "/b");
    }

    #[tokio::test]
    async fn empty_queue_is_a_fault() {
        let transport = MockTransport::new();
        let result = transport.call(&ApiRequest::post("/a", json!({}))).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn queued_fault() {
        let transport = MockTransport::new();
        transport.push_fault("reset by peer");
        let result = transport.call(&ApiRequest::post("/a", json!({}))).await;
        assert!(
            matches!(result, Err(TransportError::ConnectionFailed(ref m)) if m == "reset by peer")
        );
        assert_eq!(transport.pending(), 0);
    }
}
