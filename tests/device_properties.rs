// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Properties that hold for every registered device type.

use std::sync::Arc;

use serde_json::json;
use vesync_lib::protocol::MockTransport;
use vesync_lib::reconcile::ReconcilePolicy;
use vesync_lib::{Device, DeviceInfo, FeatureTag, Variant, registry};

fn device(device_type: &str) -> (Arc<MockTransport>, Device<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let device = Device::builder(Arc::clone(&transport), DeviceInfo::new("cid", device_type))
        .with_reconcile_policy(ReconcilePolicy::disabled())
        .build();
    (transport, device)
}

fn ok_for(variant: Variant) -> serde_json::Value {
    match variant {
        Variant::LegacyFlat => json!({"code": 0}),
        _ => json!({"code": 0, "result": {"code": 0, "result": {}}}),
    }
}

#[tokio::test]
async fn levels_outside_profile_never_reach_the_network() {
    for device_type in registry::device_types() {
        let (transport, device) = device(device_type);
        let levels = device.profile().levels.clone();

        for level in 0..=u8::MAX {
            if levels.contains(&level) {
                continue;
            }
            assert!(
                !device.change_level(level).await.unwrap(),
                "{device_type} accepted level {level}"
            );
        }
        assert_eq!(transport.call_count(), 0, "{device_type}");
    }
}

#[tokio::test]
async fn every_listed_level_is_accepted() {
    for device_type in registry::device_types() {
        let (transport, device) = device(device_type);
        let profile = device.profile().clone();

        for &level in &profile.levels {
            transport.push_ok(ok_for(profile.variant));
            assert!(
                device.change_level(level).await.unwrap(),
                "{device_type} refused level {level}"
            );
            assert_eq!(device.level(), level);
        }
    }
}

#[tokio::test]
async fn gated_operations_fail_before_any_call() {
    for device_type in registry::device_types() {
        let (transport, device) = device(device_type);
        let before = device.state();

        if !device.has_feature(FeatureTag::ChildLock) {
            assert!(device.set_child_lock(true).await.unwrap_err().is_feature_unsupported());
            assert!(device.is_child_lock_on().is_err());
        }
        if !device.has_feature(FeatureTag::Oscillation) {
            assert!(device.set_oscillation(true).await.unwrap_err().is_feature_unsupported());
        }
        if !device.has_feature(FeatureTag::Timer) {
            assert!(device.clear_timer().await.unwrap_err().is_feature_unsupported());
        }
        if !device.has_feature(FeatureTag::WarmMist) {
            assert!(device.set_warm_mist_level(1).await.unwrap_err().is_feature_unsupported());
        }

        assert_eq!(transport.call_count(), 0, "{device_type}");
        assert_eq!(device.state(), before, "{device_type}");
    }
}

#[tokio::test]
async fn rejected_commands_leave_state_untouched() {
    for device_type in registry::device_types() {
        let (transport, device) = device(device_type);
        let before = device.state();

        transport.push_response(500, json!({"code": -1}));
        assert!(!device.turn_on().await.unwrap(), "{device_type}");

        if let Some(&level) = device.profile().levels.first() {
            transport.push_ok(json!({"code": 4_000_001, "msg": "denied"}));
            assert!(!device.change_level(level).await.unwrap(), "{device_type}");
        }

        assert_eq!(device.state(), before, "{device_type}");
    }
}

#[tokio::test]
async fn clear_timer_is_idempotent_everywhere() {
    for device_type in registry::device_types() {
        let (transport, device) = device(device_type);
        if !device.has_feature(FeatureTag::Timer) {
            continue;
        }
        assert!(device.clear_timer().await.unwrap());
        assert!(device.clear_timer().await.unwrap());
        assert_eq!(transport.call_count(), 0, "{device_type}");
    }
}
