//! Tasa de GST
//!
//! Solo se admiten los tramos 0, 5, 12, 18 y 28 %. En JSON viaja como
//! número (`18`); en PostgreSQL como SMALLINT con CHECK.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GstRate(u8);

impl GstRate {
    pub const ALLOWED: [u8; 5] = [0, 5, 12, 18, 28];
    pub const ZERO: GstRate = GstRate(0);

    pub fn new(percent: u8) -> Result<Self, InvalidGstRate> {
        if Self::ALLOWED.contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(InvalidGstRate(percent as i64))
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Conversión desde la columna SMALLINT
    pub fn from_db(value: i16) -> Result<Self, InvalidGstRate> {
        u8::try_from(value)
            .map_err(|_| InvalidGstRate(value as i64))
            .and_then(Self::new)
    }

    pub fn to_db(self) -> i16 {
        self.0 as i16
    }
}

impl Default for GstRate {
    fn default() -> Self {
        Self(18)
    }
}

impl fmt::Display for GstRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for GstRate {
    type Error = InvalidGstRate;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i16> for GstRate {
    type Error = InvalidGstRate;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_db(value)
    }
}

impl From<GstRate> for u8 {
    fn from(rate: GstRate) -> Self {
        rate.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("GST percent must be one of 0, 5, 12, 18, 28 (got {0})")]
pub struct InvalidGstRate(pub i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_statutory_slabs_are_accepted() {
        for percent in GstRate::ALLOWED {
            assert!(GstRate::new(percent).is_ok());
        }
        assert!(GstRate::new(10).is_err());
        assert!(GstRate::from_db(-5).is_err());
        assert_eq!(GstRate::default().percent(), 18);
    }

    #[test]
    fn test_serde_as_plain_number() {
        let rate: GstRate = serde_json::from_str("12").unwrap();
        assert_eq!(rate.percent(), 12);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "12");
        assert!(serde_json::from_str::<GstRate>("7").is_err());
    }
}
