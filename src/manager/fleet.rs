// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::RwLock;
use tokio::task::JoinSet;

use crate::capabilities::{Family, Variant};
use crate::device::{Device, DeviceInfo};
use crate::error::{Error, ParseError};
use crate::protocol::{ApiRequest, Transport};
use crate::reconcile::ReconcilePolicy;
use crate::response::classify;

const LISTING_PATH: &str = "/cloud/v1/deviceManaged/devices";
const LISTING_PAGE_SIZE: u32 = 100;

/// Membership changes applied by [`Fleet::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Cloud ids of devices created.
    pub added: Vec<String>,
    /// Cloud ids of devices dropped.
    pub removed: Vec<String>,
    /// Cloud ids of devices kept, with refreshed identity.
    pub retained: Vec<String>,
}

/// All devices of one account, keyed by cloud id.
#[derive(Debug)]
pub struct Fleet<T: Transport> {
    transport: Arc<T>,
    devices: RwLock<HashMap<String, Device<T>>>,
    policy: ReconcilePolicy,
}

impl<T: Transport + 'static> Fleet<T> {
    /// Creates an empty fleet.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            devices: RwLock::new(HashMap::new()),
            policy: ReconcilePolicy::default(),
        }
    }

    /// Sets the reconciliation policy given to devices created from now on.
    #[must_use]
    pub fn with_reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Reconciles membership with a device listing.
    ///
    /// A listed device whose type changed is rebuilt, since its profile
    /// depends on the type.
    pub async fn sync(&self, listing: impl IntoIterator<Item = DeviceInfo>) -> SyncReport {
        let mut report = SyncReport::default();
        let mut devices = self.devices.write().await;
        let mut listed = HashSet::new();

        for info in listing {
            if info.cid.is_empty() {
                tracing::warn!(device_type = %info.device_type, "Listing entry without cid, skipped");
                continue;
            }
            let cid = info.cid.clone();
            if !listed.insert(cid.clone()) {
                continue;
            }
            match devices.get(&cid) {
                Some(device) if device.info().device_type == info.device_type => {
                    device.refresh_identity(info);
                    report.retained.push(cid);
                }
                _ => {
                    tracing::info!(
                        cid = %cid,
                        device_type = %info.device_type,
                        name = %info.device_name,
                        "Device added"
                    );
                    let device = Device::builder(Arc::clone(&self.transport), info)
                        .with_reconcile_policy(self.policy)
                        .build();
                    devices.insert(cid.clone(), device);
                    report.added.push(cid);
                }
            }
        }

        let stale: Vec<String> = devices
            .keys()
            .filter(|cid| !listed.contains(*cid))
            .cloned()
            .collect();
        for cid in stale {
            devices.remove(&cid);
            tracing::info!(cid = %cid, "Device removed");
            report.removed.push(cid);
        }

        report.added.sort();
        report.removed.sort();
        report.retained.sort();
        report
    }

    /// Fetches the account's device listing and syncs with it.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails, or `ParseError` if the
    /// listing is rejected or malformed.
    pub async fn refresh_listing(&self) -> Result<SyncReport, Error> {
        let mut body = self.transport.session().base_body("devices");
        body.insert("pageNo".to_string(), json!("1"));
        body.insert("pageSize".to_string(), json!(LISTING_PAGE_SIZE.to_string()));
        let request = ApiRequest::post(LISTING_PATH, Value::Object(body));

        let response = self.transport.call(&request).await?;
        let outcome = classify(response.status, &response.body, Variant::LegacyFlat);
        if !outcome.success {
            let reason = outcome.rejection().map(|r| r.to_string()).unwrap_or_default();
            tracing::warn!(status = response.status, reason = %reason, "Device listing rejected");
            return Err(ParseError::UnexpectedFormat(format!("device listing rejected: {reason}")).into());
        }
        let listing = parse_listing(&response.body)?;
        Ok(self.sync(listing).await)
    }

    /// Returns a handle to a device.
    pub async fn get(&self, cid: &str) -> Option<Device<T>> {
        self.devices.read().await.get(cid).cloned()
    }

    /// Returns a handle to a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device has this cid.
    pub async fn device(&self, cid: &str) -> Result<Device<T>, Error> {
        self.get(cid)
            .await
            .ok_or_else(|| Error::DeviceNotFound(cid.to_string()))
    }

    /// Returns every cloud id, sorted.
    pub async fn cids(&self) -> Vec<String> {
        let mut cids: Vec<String> = self.devices.read().await.keys().cloned().collect();
        cids.sort();
        cids
    }

    /// Returns the number of devices.
    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns `true` if the fleet has no devices.
    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }

    /// Returns every device of a family.
    pub async fn devices_of(&self, family: Family) -> Vec<Device<T>> {
        let mut devices: Vec<Device<T>> = self
            .devices
            .read()
            .await
            .values()
            .filter(|d| d.family() == family)
            .cloned()
            .collect();
        devices.sort_by_key(Device::cid);
        devices
    }

    /// Fetches details for every device in parallel.
    ///
    /// Returns whether each refresh succeeded, by cid. Transport faults
    /// count as failures and are logged.
    pub async fn update_all(&self) -> HashMap<String, bool> {
        let devices: Vec<(String, Device<T>)> = self
            .devices
            .read()
            .await
            .iter()
            .map(|(cid, device)| (cid.clone(), device.clone()))
            .collect();

        let mut tasks = JoinSet::new();
        for (cid, device) in devices {
            tasks.spawn(async move {
                let success = match device.get_details().await {
                    Ok(success) => success,
                    Err(err) => {
                        tracing::warn!(cid = %cid, error = %err, "Device refresh failed");
                        false
                    }
                };
                (cid, success)
            });
        }

        let mut results = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((cid, success)) => {
                    results.insert(cid, success);
                }
                Err(err) => tracing::warn!(error = %err, "Device refresh task failed"),
            }
        }
        results
    }
}

/// Extracts device identities from a device listing response body.
///
/// # Errors
///
/// Returns `ParseError::MissingField` if `result.list` is absent, or
/// `ParseError::Json` if an entry does not deserialize.
pub fn parse_listing(body: &Value) -> Result<Vec<DeviceInfo>, ParseError> {
    let list = body
        .pointer("/result/list")
        .ok_or_else(|| ParseError::MissingField("result.list".to_string()))?;
    if list.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(list.clone())?)
}
