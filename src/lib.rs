// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `VeSync` Lib - A Rust library to control `VeSync` air purifiers,
//! humidifiers and fans through the vendor cloud.
//!
//! The vendor API has grown four incompatible envelope shapes across device
//! generations. This library hides them behind one [`Device`] type:
//!
//! - **Capability registry**: device type to variant, features, levels and modes
//! - **Envelope validation**: nested success codes, classified per variant
//! - **Variant adapters**: request bodies and response parsing per variant
//! - **Optimistic state**: updated on success, never on failure
//! - **Reconciliation**: delayed refresh after eventually-consistent commands
//!
//! # Supported Families
//!
//! - Air purifiers: Core 200S/300S/400S/600S, Vital 100S/200S, `EverestAir`, LV-PUR131S
//! - Humidifiers: Classic, Dual, LV600S, `OasisMist`, Superior 6000S
//! - Fans: Tower Fan
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vesync_lib::manager::Fleet;
//! use vesync_lib::protocol::{HttpConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> vesync_lib::Result<()> {
//!     // Account id and token come from the vendor login.
//!     let session = Session::new("1234567", "token");
//!     let transport = Arc::new(HttpConfig::new().into_transport(session)?);
//!
//!     let fleet = Fleet::new(transport);
//!     fleet.refresh_listing().await?;
//!     fleet.update_all().await;
//!
//!     let purifier = fleet.device("vsaq1234").await?;
//!     if purifier.turn_on().await? {
//!         purifier.change_level(2).await?;
//!     }
//!     println!("{}", purifier.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! # Errors and Failures
//!
//! Commands return `Ok(false)` when the vendor refuses them; inspect
//! [`Device::last_outcome`] for the reason. Errors are reserved for
//! transport faults and for capability violations (an unsupported feature
//! or argument), which are raised before any network call.

pub mod capabilities;
pub mod command;
pub mod device;
pub mod error;
pub mod manager;
pub mod protocol;
pub mod reconcile;
pub mod registry;
pub mod response;
pub mod state;
pub mod types;

pub use capabilities::{CapabilityProfile, Family, FeatureTag, ProfileBuilder, Variant};
pub use device::{Device, DeviceBuilder, DeviceInfo, DeviceSnapshot};
pub use error::{DeviceError, Error, ParseError, Result, TransportError, ValueError};
pub use manager::Fleet;
#[cfg(feature = "http")]
pub use protocol::{HttpConfig, HttpTransport};
pub use protocol::{MockTransport, Session, Transport};
pub use reconcile::ReconcilePolicy;
pub use response::{Outcome, Rejection, VendorCode};
pub use state::{DeviceState, StateChange, Timer};
pub use types::{
    AirQuality, AutoPreference, Brightness, Connectivity, NightLight, PowerStatus, TargetHumidity,
    TimerAction,
};
