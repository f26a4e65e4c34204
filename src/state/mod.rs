// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] is the per-device snapshot; [`StateChange`] is the only
//! way to mutate it. Changes are applied as a group, so a command either
//! updates every field it touches or none of them.
//!
//! # Examples
//!
//! ```
//! use vesync_lib::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//! state.apply(&StateChange::Display(true));
//! assert!(state.display_on());
//! ```

mod device_state;
mod state_change;
mod timer;

pub use device_state::DeviceState;
pub use state_change::{StateChange, UNRECOGNIZED_MODE_KEY};
pub use timer::Timer;
