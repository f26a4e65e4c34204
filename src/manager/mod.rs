// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fleet of devices belonging to one account.
//!
//! The [`Fleet`] keeps one [`Device`](crate::Device) per cloud id, all
//! sharing the account's transport. Its membership follows the vendor's
//! device listing: [`Fleet::sync`] adds newly listed devices and drops
//! those no longer listed, discarding their state.
//!
//! Devices share nothing mutable but the transport, so fleet-wide refresh
//! runs every device in parallel.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use vesync_lib::DeviceInfo;
//! use vesync_lib::capabilities::Family;
//! use vesync_lib::manager::Fleet;
//! use vesync_lib::protocol::MockTransport;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fleet = Fleet::new(Arc::new(MockTransport::new()));
//! let report = fleet
//!     .sync(vec![
//!         DeviceInfo::new("cid-a", "Core300S"),
//!         DeviceInfo::new("cid-b", "LUH-O451S-WUS"),
//!     ])
//!     .await;
//!
//! assert_eq!(report.added.len(), 2);
//! assert_eq!(fleet.len().await, 2);
//! assert_eq!(fleet.devices_of(Family::Humidifier).await.len(), 1);
//! # }
//! ```

mod fleet;

pub use fleet::{Fleet, SyncReport, parse_listing};
