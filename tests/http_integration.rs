// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use vesync_lib::manager::Fleet;
use vesync_lib::protocol::{ApiRequest, HttpConfig, HttpTransport, Session, Transport};
use vesync_lib::reconcile::ReconcilePolicy;
use vesync_lib::{Connectivity, Device, DeviceInfo, Rejection, TransportError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BYPASS_V2: &str = "/cloud/v2/deviceManaged/bypassV2";

fn session() -> Session {
    Session::new("1234567", "tk-test").with_time_zone("Europe/Paris")
}

fn transport(server: &MockServer) -> Arc<HttpTransport> {
    Arc::new(
        HttpConfig::new()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2))
            .into_transport(session())
            .unwrap(),
    )
}

fn bypass_ok(result: Value) -> Value {
    json!({"traceId": "1", "code": 0, "msg": "request success",
           "result": {"code": 0, "result": result, "traceId": "1"}})
}

fn info(cid: &str, device_type: &str) -> DeviceInfo {
    let mut info = DeviceInfo::new(cid, device_type);
    info.uuid = format!("uuid-{cid}");
    info.config_module = "WFON_AP".to_string();
    info.device_region = "EU".to_string();
    info.connection_status = "online".to_string();
    info
}

// ============================================================================
// HttpTransport Tests
// ============================================================================

mod http_transport {
    use super::*;

    #[tokio::test]
    async fn sends_session_headers_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cloud/v1/deviceManaged/devices"))
            .and(header("tk", "tk-test"))
            .and(header("accountId", "1234567"))
            .and(header("tz", "Europe/Paris"))
            .and(body_partial_json(json!({"method": "devices", "token": "tk-test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server);
        let body = Value::Object(transport.session().base_body("devices"));
        let response = transport
            .call(&ApiRequest::post("/cloud/v1/deviceManaged/devices", body))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["code"], 0);
    }

    #[tokio::test]
    async fn server_error_is_a_response() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let response = transport(&server)
            .call(&ApiRequest::put("/x", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn unauthorized_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = transport(&server)
            .call(&ApiRequest::post("/x", json!({})))
            .await;
        assert!(matches!(result, Err(TransportError::AuthenticationFailed)));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = HttpConfig::new()
            .with_base_url("ftp://example.com")
            .into_transport(session());
        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }
}

// ============================================================================
// Device Tests
// ============================================================================

mod device {
    use super::*;

    #[tokio::test]
    async fn bypass_purifier_details_and_level() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BYPASS_V2))
            .and(body_partial_json(json!({
                "cid": "c300",
                "configModule": "WFON_AP",
                "deviceRegion": "EU",
                "payload": {"method": "getPurifierStatus", "source": "APP"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(bypass_ok(json!({
                "enabled": true, "filter_life": 97, "mode": "manual", "level": 1,
                "air_quality": 1, "air_quality_value": 3, "display": true,
                "child_lock": false, "configuration": {"display": true}
            }))))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(BYPASS_V2))
            .and(body_partial_json(json!({
                "payload": {"method": "setLevel", "data": {"level": 3, "type": "wind"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(bypass_ok(json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let device = Device::new(transport(&server), info("c300", "Core300S"));

        assert!(device.get_details().await.unwrap());
        assert!(device.is_on());
        assert_eq!(device.level(), 1);
        assert_eq!(device.filter_life().unwrap(), Some(97));

        assert!(device.change_level(3).await.unwrap());
        assert_eq!(device.level(), 3);
        assert_eq!(device.mode(), "manual");

        // Level 4 is outside the Core300S profile: no third request.
        assert!(!device.change_level(4).await.unwrap());
    }

    #[tokio::test]
    async fn legacy_power_uses_flat_put() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/131airPurifier/v1/device/deviceStatus"))
            .and(body_partial_json(json!({"uuid": "uuid-p131", "status": "on"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "msg": "request success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let device = Device::new(transport(&server), info("p131", "LV-PUR131S"));
        assert!(device.turn_on().await.unwrap());
        assert!(device.is_on());
    }

    #[tokio::test]
    async fn legacy_without_code_is_judged_by_status() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/131airPurifier/v1/device/updateScreen"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "ok"})))
            .mount(&server)
            .await;

        let device = Device::new(transport(&server), info("p131", "LV-PUR131S"));
        assert!(device.display_off().await.unwrap());
        assert!(!device.is_display_on());
    }

    #[tokio::test]
    async fn vital_details_tolerate_stale_inner_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BYPASS_V2))
            .and(body_partial_json(json!({"payload": {"method": "getPurifierStatus"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "msg": "request success",
                "result": {"code": -1, "result": {
                    "powerSwitch": 1, "workMode": "auto", "fanSpeedLevel": 255,
                    "manualSpeedLevel": 2, "screenSwitch": 0, "childLockSwitch": 1,
                    "lightDetectionSwitch": 1, "AQLevel": 2, "PM25": 11,
                    "filterLifePercent": 80, "timerRemain": 0,
                    "autoPreference": {"autoPreferenceType": "quiet", "roomSize": 600}
                }}
            })))
            .mount(&server)
            .await;

        let device = Device::builder(transport(&server), info("v200", "LAP-V201S-WUS"))
            .with_reconcile_policy(ReconcilePolicy::disabled())
            .build();

        assert!(device.get_details().await.unwrap());
        assert_eq!(device.mode(), "auto");
        // 255 is outside the profile and is stored as 0.
        assert_eq!(device.level(), 0);
        assert!(device.is_child_lock_on().unwrap());
        assert!(device.light_detection().unwrap());
        assert_eq!(device.pm25().unwrap(), Some(11));
        assert_eq!(
            device.auto_preference().unwrap().map(|p| p.kind),
            Some("quiet".to_string())
        );
        assert!(device.timer().is_none());
    }

    #[tokio::test]
    async fn server_error_is_a_retriable_false() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let device = Device::new(transport(&server), info("c400", "Core400S"));
        assert!(!device.turn_on().await.unwrap());
        assert!(!device.is_on());

        let outcome = device.last_outcome().unwrap();
        assert_eq!(outcome.rejection(), Some(Rejection::HttpStatus(502)));
        assert!(outcome.retriable);
    }

    #[tokio::test]
    async fn offline_code_marks_device_offline() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": -11_300_030, "msg": "device offline"
            })))
            .mount(&server)
            .await;

        let device = Device::new(transport(&server), info("c400", "Core400S"));
        assert!(!device.get_details().await.unwrap());
        assert_eq!(device.connectivity(), Connectivity::Offline);
    }
}

// ============================================================================
// Fleet Tests
// ============================================================================

mod fleet {
    use super::*;

    #[tokio::test]
    async fn listing_then_parallel_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cloud/v1/deviceManaged/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "msg": "request success",
                "result": {"total": 2, "pageSize": 100, "pageNo": 1, "list": [
                    {"cid": "c300", "uuid": "u1", "deviceName": "Office",
                     "deviceType": "Core300S", "configModule": "WFON_AP",
                     "deviceRegion": "EU", "connectionStatus": "online"},
                    {"cid": "h450", "uuid": "u2", "deviceName": "Nursery",
                     "deviceType": "LUH-O451S-WUS", "configModule": "WFON_AH",
                     "deviceRegion": "EU", "connectionStatus": "online"}
                ]}
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(BYPASS_V2))
            .and(body_partial_json(json!({"payload": {"method": "getPurifierStatus"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(bypass_ok(json!({
                "enabled": false, "mode": "sleep", "level": 0
            }))))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(BYPASS_V2))
            .and(body_partial_json(json!({"payload": {"method": "getHumidifierStatus"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(bypass_ok(json!({
                "enabled": true, "humidity": 41, "mist_virtual_level": 4,
                "mode": "manual", "water_lacks": false,
                "configuration": {"auto_target_humidity": 50}
            }))))
            .mount(&server)
            .await;

        let fleet = Fleet::new(transport(&server));
        let report = fleet.refresh_listing().await.unwrap();
        assert_eq!(report.added, ["c300", "h450"]);

        let results = fleet.update_all().await;
        assert_eq!(results.get("c300"), Some(&true));
        assert_eq!(results.get("h450"), Some(&true));

        let humidifier = fleet.device("h450").await.unwrap();
        assert_eq!(humidifier.humidity().unwrap(), Some(41));
        assert_eq!(humidifier.target_humidity().unwrap(), Some(50));
        assert_eq!(humidifier.level(), 4);

        let purifier = fleet.device("c300").await.unwrap();
        assert!(!purifier.is_on());
        assert_eq!(purifier.mode(), "sleep");
    }
}
