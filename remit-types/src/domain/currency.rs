//! Currency codes, currency pairs, and decimal money.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated ISO-4217 currency code (three ASCII letters, stored uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "SGD")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and validates a currency code. Lowercase input is accepted
    /// and normalized.
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An ordered (source, target) currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CurrencyPair {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(source: CurrencyCode, target: CurrencyCode) -> Self {
        Self { source, target }
    }

    /// Parses a pair from two raw code strings.
    pub fn parse(source: &str, target: &str) -> Result<Self, DomainError> {
        Ok(Self::new(
            CurrencyCode::parse(source)?,
            CurrencyCode::parse(target)?,
        ))
    }

    /// The same pair with source and target swapped.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

/// Decimal money with embedded currency.
///
/// Amounts are never binary floating point; all fee and margin
/// arithmetic is exact decimal. Serde emits the amount as a decimal
/// string (e.g. `"39.75"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Money {
    pub currency: CurrencyCode,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
}

impl Money {
    pub fn new(currency: CurrencyCode, amount: Decimal) -> Self {
        Self { currency, amount }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            currency,
            amount: Decimal::ZERO,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Checked addition - returns error if currencies don't match.
    pub fn checked_add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency.clone(),
                got: other.currency.clone(),
            });
        }
        Ok(Money {
            currency: self.currency.clone(),
            amount: self.amount + other.amount,
        })
    }

    /// A percentage of this amount, e.g. `percent(dec!(1.5))` is 1.5%.
    pub fn percent(&self, pct: Decimal) -> Money {
        Money {
            currency: self.currency.clone(),
            amount: self.amount * pct / Decimal::ONE_HUNDRED,
        }
    }

    /// Returns the larger of the two amounts. Currencies must match.
    pub fn max(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency.clone(),
                got: other.currency.clone(),
            });
        }
        Ok(if self.amount >= other.amount {
            self.clone()
        } else {
            other.clone()
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
