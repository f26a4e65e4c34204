// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device builder.

use std::sync::Arc;

use crate::capabilities::CapabilityProfile;
use crate::device::{Device, DeviceInfo};
use crate::protocol::Transport;
use crate::reconcile::ReconcilePolicy;
use crate::registry;

/// Builder for [`Device`].
///
/// By default the capability profile is looked up from the registry by
/// device type and reconciliation uses [`ReconcilePolicy::default`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vesync_lib::{Device, DeviceInfo};
/// use vesync_lib::capabilities::{Family, ProfileBuilder, Variant};
/// use vesync_lib::protocol::MockTransport;
/// use vesync_lib::reconcile::ReconcilePolicy;
///
/// let transport = Arc::new(MockTransport::new());
///
/// // Registry lookup
/// let device = Device::builder(Arc::clone(&transport), DeviceInfo::new("c1", "Core400S")).build();
/// assert_eq!(device.profile().model, "Core400S");
///
/// // Custom profile, no reconciliation
/// let profile = ProfileBuilder::new(Variant::VitalQuirk, Family::AirPurifier)
///     .model("Prototype")
///     .levels_up_to(2)
///     .modes(["manual", "auto"])
///     .build();
/// let device = Device::builder(transport, DeviceInfo::new("c2", "LAP-PROTO"))
///     .with_profile(profile)
///     .with_reconcile_policy(ReconcilePolicy::disabled())
///     .build();
/// assert_eq!(device.profile().model, "Prototype");
/// assert!(!device.reconcile_policy().is_enabled());
/// ```
#[derive(Debug)]
pub struct DeviceBuilder<T: Transport> {
    transport: Arc<T>,
    info: DeviceInfo,
    profile: Option<CapabilityProfile>,
    policy: ReconcilePolicy,
}

impl<T: Transport + 'static> DeviceBuilder<T> {
    /// Creates a builder for the given identity.
    #[must_use]
    pub fn new(transport: Arc<T>, info: DeviceInfo) -> Self {
        Self {
            transport,
            info,
            profile: None,
            policy: ReconcilePolicy::default(),
        }
    }

    /// Sets the capability profile manually (skips the registry lookup).
    #[must_use]
    pub fn with_profile(mut self, profile: CapabilityProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Sets the reconciliation policy.
    #[must_use]
    pub fn with_reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the manually set profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&CapabilityProfile> {
        self.profile.as_ref()
    }

    /// Builds the device.
    #[must_use]
    pub fn build(self) -> Device<T> {
        let profile = self
            .profile
            .unwrap_or_else(|| registry::lookup(&self.info.device_type).clone());
        Device::from_parts(self.transport, self.info, profile, self.policy)
    }
}
