// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device control.
//!
//! Range-limited values are validated at construction time, so a command
//! that takes one of these types never has to re-check it.
//!
//! # Types
//!
//! - [`PowerStatus`] - On/Off
//! - [`Connectivity`] - Online/Offline as seen by the cloud
//! - [`NightLight`] - Off/On/Dim
//! - [`Brightness`] - Night light brightness (0-100%)
//! - [`TargetHumidity`] - Humidifier target (30-80%)
//! - [`AirQuality`] - Sensor index (1-4)
//! - [`AutoPreference`] - Auto-mode tuning of newer purifiers
//! - [`TimerAction`] - What a timer does on expiry

mod air;
mod humidity;
mod light;
mod power;
mod timer;

pub use air::{AirQuality, AutoPreference};
pub use humidity::TargetHumidity;
pub use light::{Brightness, NightLight};
pub use power::{Connectivity, PowerStatus};
pub use timer::TimerAction;
