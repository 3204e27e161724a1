//! Fixed-point arithmetic implementation
//!
//! Every price, volume and balance in bitbot is a `Fixed`. Venues send
//! numbers either as JSON strings or JSON numbers; both are parsed exactly
//! through their textual form so no value ever passes through `f64`.

use rust_decimal::{Decimal, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Fixed-point decimal type for exact financial calculations
///
/// Bounded to +/- 999999999999.999999999999, which covers any quote-currency
/// balance and the smallest satoshi-scale volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    /// Maximum value: 999999999999.999999999999
    pub fn max_value() -> Self {
        Fixed {
            value: Decimal::from_i128_with_scale(999_999_999_999_999_999_999_999, 12),
        }
    }

    /// Minimum value: -999999999999.999999999999
    pub fn min_value() -> Self {
        Fixed {
            value: Decimal::from_i128_with_scale(-999_999_999_999_999_999_999_999, 12),
        }
    }

    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    pub const ONE_HUNDRED: Fixed = Fixed {
        value: Decimal::ONE_HUNDRED,
    };

    /// Create a new Fixed from a Decimal, rejecting out-of-range values
    pub fn from_decimal(value: Decimal) -> Result<Self, FixedError> {
        let fixed = Fixed { value };

        if fixed > Self::max_value() || fixed < Self::min_value() {
            return Err(FixedError::OutOfRange);
        }

        Ok(fixed)
    }

    /// Create a Fixed from an integer
    pub fn from_i64(value: i64) -> Result<Self, FixedError> {
        Self::from_decimal(Decimal::from(value))
    }

    /// Parse a Fixed from its exact decimal representation
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        let decimal = Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map_err(|_| FixedError::InvalidValue(s.to_string()))?;
        Self::from_decimal(decimal)
    }

    /// Parse a Fixed from a JSON string or JSON number
    pub fn from_json(value: &Value) -> Result<Self, FixedError> {
        match value {
            Value::String(s) => Self::from_str_exact(s),
            Value::Number(n) => Self::from_str_exact(&n.to_string()),
            other => Err(FixedError::InvalidValue(other.to_string())),
        }
    }

    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Format with exactly `scale` decimal places
    pub fn to_string_with_scale(&self, scale: u32) -> String {
        format!("{:.1$}", self.value.round_dp(scale), scale as usize)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Fixed {
            value: self.value.abs(),
        }
    }

    /// Round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Fixed {
            value: self.value.round_dp(dp),
        }
    }

    /// Division that reports a zero divisor instead of panicking
    pub fn checked_div(&self, rhs: Fixed) -> Result<Fixed, FixedError> {
        self.value
            .checked_div(rhs.value)
            .map(|value| Fixed { value })
            .ok_or(FixedError::DivisionByZero)
    }

    /// Percentage by which `self` exceeds `base`: `100 * (self / base - 1)`
    pub fn percent_above(&self, base: Fixed) -> Result<Fixed, FixedError> {
        let ratio = self.checked_div(base)?;
        Ok((ratio - Fixed::ONE) * Fixed::ONE_HUNDRED)
    }
}

/// Fixed-point arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Value out of range (max: 999999999999.999999999999)")]
    OutOfRange,
    #[error("Invalid decimal value: {0}")]
    InvalidValue(String),
    #[error("Division by zero")]
    DivisionByZero,
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value - rhs.value,
        }
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value * rhs.value,
        }
    }
}

impl Div for Fixed {
    type Output = Fixed;

    /// Panics on a zero divisor; use `checked_div` for untrusted input.
    fn div(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value / rhs.value,
        }
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}

/// Convenience macro for creating Fixed literals in tests and constants
#[macro_export]
macro_rules! fixed {
    ($value:expr) => {
        $crate::fixed::Fixed::from_str_exact(stringify!($value)).unwrap()
    };
}
