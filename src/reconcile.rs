// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delayed state refresh after eventually-consistent commands.
//!
//! Vital-quirk devices acknowledge a command before their status read path
//! reflects it. After such a command the device schedules a detached
//! refresh: one detail fetch after [`ReconcilePolicy::delay`], at most one
//! follow-up after [`ReconcilePolicy::retry_delay`] if that fails, then the
//! attempt is logged and dropped. The caller's command has already
//! returned by then and no handle to the task is exposed.
//!
//! A refresh is skipped when an explicit detail fetch completed after it
//! was scheduled; both write the same fields, so the newer one wins.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;

/// Timing of reconciliation refreshes.
///
/// # Examples
///
/// ```
/// use vesync_lib::reconcile::ReconcilePolicy;
/// use std::time::Duration;
///
/// let policy = ReconcilePolicy::new()
///     .with_delay(Duration::from_secs(5))
///     .with_retry(false);
/// assert_eq!(policy.delay(), Duration::from_secs(5));
/// assert!(policy.is_enabled());
///
/// assert!(!ReconcilePolicy::disabled().is_enabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    enabled: bool,
    delay: Duration,
    retry: bool,
    retry_delay: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcilePolicy {
    /// Default wait before the first refresh.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);
    /// Default wait before the follow-up refresh.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

    /// Creates the default policy: refresh after 2 s, one retry after 2 s.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: true,
            delay: Self::DEFAULT_DELAY,
            retry: true,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    /// Creates a policy that never schedules a refresh.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Sets the wait before the first refresh.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enables or disables the follow-up refresh.
    #[must_use]
    pub const fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the wait before the follow-up refresh.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Returns `true` if refreshes are scheduled at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the wait before the first refresh.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `true` if one follow-up refresh is allowed.
    #[must_use]
    pub const fn retry(&self) -> bool {
        self.retry
    }

    /// Returns the wait before the follow-up refresh.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Something whose state can be re-fetched in the background.
pub trait Refresh: Send + Sync + 'static {
    /// Re-fetches the state. Returns `true` on success; never fails loudly.
    fn refresh(&self) -> impl Future<Output = bool> + Send;

    /// Counter bumped by every explicit detail fetch, never by [`Refresh::refresh`].
    fn refresh_generation(&self) -> u64;

    /// Name used in log records.
    fn label(&self) -> String;
}

/// Schedules a best-effort refresh of `target`.
///
/// Returns immediately. Returns `false` if nothing was scheduled, because
/// the policy is disabled or no tokio runtime is running.
pub fn schedule_refresh<R: Refresh>(target: R, policy: &ReconcilePolicy) -> bool {
    if !policy.is_enabled() {
        return false;
    }
    let Ok(handle) = Handle::try_current() else {
        tracing::warn!(target = %target.label(), "No tokio runtime, reconciliation skipped");
        return false;
    };

    let policy = *policy;
    let generation = target.refresh_generation();
    tracing::debug!(
        target = %target.label(),
        delay_ms = policy.delay().as_millis(),
        "Reconciliation scheduled"
    );

    handle.spawn(async move {
        run(target, policy, generation).await;
    });
    true
}

async fn run<R: Refresh>(target: R, policy: ReconcilePolicy, generation: u64) {
    tokio::time::sleep(policy.delay()).await;
    if superseded(&target, generation) {
        return;
    }
    if target.refresh().await {
        tracing::debug!(target = %target.label(), "Reconciliation refresh succeeded");
        return;
    }
    if !policy.retry() {
        tracing::warn!(target = %target.label(), "Reconciliation refresh failed");
        return;
    }

    tokio::time::sleep(policy.retry_delay()).await;
    if superseded(&target, generation) {
        return;
    }
    if target.refresh().await {
        tracing::debug!(target = %target.label(), "Reconciliation retry succeeded");
    } else {
        tracing::warn!(
            target = %target.label(),
            "Reconciliation failed after retry, state may be stale until next refresh"
        );
    }
}

fn superseded<R: Refresh>(target: &R, generation: u64) -> bool {
    let current = target.refresh_generation();
    if current == generation {
        return false;
    }
    tracing::debug!(
        target = %target.label(),
        scheduled = generation,
        current,
        "Reconciliation superseded by a newer refresh"
    );
    true
}
