// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response classification and parsing.
//!
//! [`classify`] and [`classify_access`] decide whether a vendor response
//! is a success. The [`legacy`], [`bypass`] and [`vital`] modules hold the
//! typed payload schemas of each variant; every schema keeps the fields it
//! does not know in a flattened `extra` map.

pub mod bypass;
mod envelope;
pub mod legacy;
pub mod vital;

pub use envelope::{
    Access, Outcome, Rejection, VendorCode, classify, classify_access, payload,
};
