//! Money type for representing monetary values.
//!
//! Uses a minor-unit integer representation (cents) to avoid the
//! floating-point drift that plagues repeated monetary additions. Decimal
//! amounts arriving from the API are converted through `rust_decimal`, never
//! through `f64` arithmetic.

use crate::error::CommerceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Kenyan Shilling, the storefront's operating currency.
    #[default]
    KES,
    UGX,
    TZS,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "KES").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::KES => "KES",
            Currency::UGX => "UGX",
            Currency::TZS => "TZS",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Get the display symbol (e.g., "Ksh").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::KES => "Ksh",
            Currency::UGX => "USh",
            Currency::TZS => "TSh",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub const fn decimal_places(&self) -> u32 {
        match self {
            Currency::UGX => 0,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for cents).
    pub const fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "KES" => Some(Currency::KES),
            "UGX" => Some(Currency::UGX),
            "TZS" => Some(Currency::TZS),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub const fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Whole Kenyan Shillings.
    ///
    /// ```
    /// use dawa_commerce::money::Money;
    /// assert_eq!(Money::kes(850).amount_cents, 85_000);
    /// ```
    pub const fn kes(units: i64) -> Self {
        Self::new(units * Currency::KES.minor_per_major(), Currency::KES)
    }

    /// Create a Money value from a decimal amount in major units.
    ///
    /// Rounds half away from zero to the currency's precision.
    ///
    /// ```
    /// use dawa_commerce::money::{Currency, Money};
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let price = Money::from_decimal(Decimal::from_str("49.995").unwrap(), Currency::KES).unwrap();
    /// assert_eq!(price.amount_cents, 5000);
    /// ```
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, CommerceError> {
        let scaled = amount
            .round_dp_with_strategy(currency.decimal_places(), RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(currency.minor_per_major()))
            .and_then(|d| d.to_i64())
            .ok_or_else(|| CommerceError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(scaled, currency))
    }

    /// Create a zero amount in the given currency.
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to an exact decimal value in major units.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_cents, self.currency.decimal_places())
    }

    /// Format as a display string (e.g., "Ksh 1,234.56").
    pub fn display(&self) -> String {
        format!("{} {}", self.currency.symbol(), self.display_amount())
    }

    /// Format without symbol, with thousands separators (e.g., "1,234.56").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let divisor = self.currency.minor_per_major();
        let abs = self.amount_cents.unsigned_abs();
        let whole = group_thousands(abs / divisor.unsigned_abs());
        let sign = if self.is_negative() { "-" } else { "" };
        if places == 0 {
            format!("{sign}{whole}")
        } else {
            let frac = abs % divisor.unsigned_abs();
            format!("{sign}{whole}.{frac:0width$}", width = places as usize)
        }
    }

    /// Parse a display string such as "Ksh 1,234.56" or "1234.56".
    ///
    /// Everything except digits and the decimal point is ignored; input that
    /// still does not parse reads as zero.
    pub fn parse_display(input: &str, currency: Currency) -> Money {
        let cleaned: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        cleaned
            .parse::<Decimal>()
            .ok()
            .and_then(|d| Money::from_decimal(d, currency).ok())
            .unwrap_or(Money::zero(currency))
    }

    /// Try to add another Money value, returning None if currencies don't match
    /// or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values, returning None on currency mismatch or overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl PartialOrd for Money {
    /// Amounts in different currencies are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.amount_cents.cmp(&other.amount_cents))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if value < 1000 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    groups.reverse();
    groups.join(",")
}

/// Serde adapter for amounts the storefront API sends as plain JSON numbers
/// in Kenyan Shillings (`"price": 850.5`).
pub mod major_units {
    use super::{Currency, Money};
    use serde::{Deserializer, Serializer};

    /// Serialize as a JSON number in major units.
    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&money.to_decimal(), serializer)
    }

    /// Deserialize a JSON number in major units as KES.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Money::from_decimal(amount, Currency::KES).map_err(serde::de::Error::custom)
    }
}
