use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ValueObject};

/// A discount rate in whole percentage units (`10.0` means 10%).
///
/// Always within `[0, 100]`; construction rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DiscountPercent(f64);

impl DiscountPercent {
    pub const ZERO: Self = Self(0.0);
    pub const MAX: f64 = 100.0;

    pub fn new(percent: f64) -> DomainResult<Self> {
        if !percent.is_finite() {
            return Err(DomainError::invalid_argument(
                "discount percent must be a finite number",
            ));
        }
        if !(0.0..=Self::MAX).contains(&percent) {
            return Err(DomainError::invalid_argument(format!(
                "discount percent must be between 0 and 100, got {percent}"
            )));
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    /// Price multiplier for a discounted item (10% -> 0.90).
    pub fn multiplier(&self) -> f64 {
        1.0 - self.0 / 100.0
    }
}

impl ValueObject for DiscountPercent {}

impl TryFrom<f64> for DiscountPercent {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
