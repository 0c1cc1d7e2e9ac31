use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Hypothetical amount invested on the buy day. Zero disables return projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct InvestmentAmount(Decimal);

impl InvestmentAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeInvestment);
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for InvestmentAmount {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidAmount {
            value: value.to_owned(),
        })?;
        Self::new(parsed)
    }
}

impl TryFrom<Decimal> for InvestmentAmount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InvestmentAmount> for Decimal {
    fn from(value: InvestmentAmount) -> Self {
        value.0
    }
}

impl Display for InvestmentAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}
