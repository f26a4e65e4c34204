// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracked device timer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::TimerAction;

/// A timer armed on the device.
///
/// The vendor reports the remaining time at the moment of a call. The
/// timestamp of that observation is kept so [`Timer::remaining_seconds`]
/// keeps counting down between refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timer {
    id: Option<u64>,
    action: TimerAction,
    total_seconds: u32,
    reported_remaining: u32,
    observed_at: DateTime<Utc>,
}

impl Timer {
    /// Creates a timer observed now.
    #[must_use]
    pub fn new(id: Option<u64>, action: TimerAction, total_seconds: u32, remaining: u32) -> Self {
        Self::observed(id, action, total_seconds, remaining, Utc::now())
    }

    /// Creates a timer observed at the given instant.
    #[must_use]
    pub fn observed(
        id: Option<u64>,
        action: TimerAction,
        total_seconds: u32,
        remaining: u32,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action,
            total_seconds,
            reported_remaining: remaining,
            observed_at,
        }
    }

    /// Vendor timer id, if known.
    ///
    /// Detail fetches report a countdown without an id; call
    /// [`Device::get_timer`](crate::Device::get_timer) to resolve it.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Returns the action run on expiry.
    #[must_use]
    pub fn action(&self) -> TimerAction {
        self.action
    }

    /// Returns the duration the timer was armed with.
    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// Returns the remaining seconds as last reported by the vendor.
    #[must_use]
    pub fn reported_remaining(&self) -> u32 {
        self.reported_remaining
    }

    /// Returns when the remaining time was reported.
    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Returns the remaining seconds as of now.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_at(Utc::now())
    }

    /// Returns the remaining seconds at the given instant, saturating at 0.
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let elapsed = (now - self.observed_at).num_seconds().max(0);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.reported_remaining.saturating_sub(elapsed)
    }

    /// Returns `true` once the countdown has reached zero.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds() == 0
    }

    pub(crate) fn with_id(mut self, id: Option<u64>) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn counts_down_from_observation() {
        let at = Utc::now();
        let timer = Timer::observed(Some(7), TimerAction::Off, 600, 600, at);
        assert_eq!(timer.remaining_at(at + Duration::seconds(90)), 510);
        assert_eq!(timer.remaining_at(at + Duration::seconds(900)), 0);
    }

    #[test]
    fn clock_skew_does_not_add_time() {
        let at = Utc::now();
        let timer = Timer::observed(None, TimerAction::On, 60, 30, at);
        assert_eq!(timer.remaining_at(at - Duration::seconds(10)), 30);
    }

    #[test]
    fn with_id_keeps_countdown() {
        let timer = Timer::new(None, TimerAction::Off, 120, 100).with_id(Some(3));
        assert_eq!(timer.id(), Some(3));
        assert_eq!(timer.reported_remaining(), 100);
    }
}
