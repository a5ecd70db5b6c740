//! Money type stored as integer minor units with a currency tag.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `i64` minor units (cents for USD, whole yen for JPY); conversion
//! to `rust_decimal::Decimal` exists only at the edges for display and input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by money arithmetic and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: Currency,
        /// Currency of the right operand.
        right: Currency,
    },

    /// The result does not fit in 64-bit minor units.
    #[error("Amount overflow")]
    Overflow,

    /// A decimal input has more fractional digits than the currency allows.
    #[error("{amount} has more precision than {currency} allows ({exponent} decimal places)")]
    Precision {
        /// The rejected input amount.
        amount: Decimal,
        /// Target currency.
        currency: Currency,
        /// Allowed number of decimal places.
        exponent: u32,
    },
}

/// Represents a monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., cents).
    pub minor_units: i64,
    /// ISO 4217 currency code (e.g., "USD", "IDR").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
}

impl Currency {
    /// Number of decimal places between major and minor units.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        match self {
            Self::Jpy => 0,
            Self::Usd | Self::Idr | Self::Eur | Self::Sgd => 2,
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Idr => "IDR",
            Self::Eur => "EUR",
            Self::Sgd => "SGD",
            Self::Jpy => "JPY",
        }
    }
}

impl Money {
    /// Creates a new Money instance from minor units.
    #[must_use]
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        self.minor_units
            .checked_add(other.minor_units)
            .map(|v| Self::new(v, self.currency))
            .ok_or(MoneyError::Overflow)
    }

    /// Subtracts `other` from `self`.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        self.minor_units
            .checked_sub(other.minor_units)
            .map(|v| Self::new(v, self.currency))
            .ok_or(MoneyError::Overflow)
    }

    /// Returns the additive inverse.
    pub fn negate(self) -> Result<Self, MoneyError> {
        self.minor_units
            .checked_neg()
            .map(|v| Self::new(v, self.currency))
            .ok_or(MoneyError::Overflow)
    }

    /// Absolute value.
    pub fn abs(self) -> Result<Self, MoneyError> {
        if self.is_negative() {
            self.negate()
        } else {
            Ok(self)
        }
    }

    /// Converts to a decimal in major units (e.g. `100.00` for 10000 cents).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor_units, self.currency.minor_unit_exponent())
    }

    /// Converts a decimal major-unit amount to minor units.
    ///
    /// Fails if `amount` carries more fractional digits than the currency
    /// allows, or if the result does not fit in `i64`.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        let exponent = currency.minor_unit_exponent();
        let normalized = amount.normalize();
        if normalized.scale() > exponent {
            return Err(MoneyError::Precision {
                amount,
                currency,
                exponent,
            });
        }
        let factor = Decimal::from(10_i64.pow(exponent));
        let scaled = normalized.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        let minor = i64::try_from(scaled).map_err(|_| MoneyError::Overflow)?;
        Ok(Self::new(minor, currency))
    }

    fn same_currency(self, other: Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "IDR" => Ok(Self::Idr),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
