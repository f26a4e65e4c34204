// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target humidity for humidifiers.

use std::fmt;

use crate::error::ValueError;

/// Target relative humidity in percent (30-80).
///
/// Humidifiers in auto mode regulate towards this value.
///
/// # Examples
///
/// ```
/// use vesync_lib::types::TargetHumidity;
///
/// let target = TargetHumidity::new(55).unwrap();
/// assert_eq!(target.value(), 55);
/// assert!(TargetHumidity::new(85).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TargetHumidity(u8);

impl TargetHumidity {
    /// Lowest accepted target.
    pub const MIN: u8 = 30;

    /// Highest accepted target.
    pub const MAX: u8 = 80;

    /// Creates a target humidity.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [30, 80].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TargetHumidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for TargetHumidity {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert!(TargetHumidity::new(30).is_ok());
        assert!(TargetHumidity::new(80).is_ok());
    }

    #[test]
    fn rejects_outside_bounds() {
        assert_eq!(
            TargetHumidity::new(29),
            Err(ValueError::OutOfRange {
                min: 30,
                max: 80,
                actual: 29
            })
        );
        assert!(TargetHumidity::try_from(81).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(TargetHumidity::new(45).unwrap().to_string(), "45%");
    }
}
