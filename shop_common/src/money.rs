use std::{fmt::Display, iter::Sum, ops::Mul, str::FromStr};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "EUR";

//--------------------------------------       Money         ---------------------------------------------------------
/// An exact decimal amount in the shop currency.
///
/// Amounts arrive from the backend as JSON numbers or numeric strings. Arithmetic is done on the decimal
/// representation, so summing line items never rounds part-way through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(unary Money, Neg, neg);

/// Saturates at the representable range. Use [`Money::checked_mul_qty`] where overflow must be detected.
impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

/// Saturates at the representable range, like `Mul<i64>`.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::saturating_add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as an amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyConversionError;

    /// Converts through the shortest decimal rendering of the float, so `49.99_f64` becomes exactly `49.99`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MoneyConversionError(format!("{value} is not a finite number")));
        }
        value.to_string().parse()
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|e| MoneyConversionError(format!("'{s}': {e}")))
    }
}

impl Display for Money {
    /// Plain decimal rendering without trailing zeros, e.g. `110` or `49.5`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// A whole amount, usable in constants.
    pub const fn from_units(units: i64) -> Self {
        let abs = units.unsigned_abs();
        Self(Decimal::from_parts(abs as u32, (abs >> 32) as u32, 0, units < 0, 0))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self × quantity`, or `None` if the product does not fit.
    pub fn checked_mul_qty(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Divides by a count, returning zero for an empty set rather than failing.
    pub fn average_over(self, count: usize) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        self.0.checked_div(Decimal::from(count as u64)).map(Self).unwrap_or(Self::ZERO)
    }

    /// Two-decimal rendering with the currency code, for operator-facing output.
    pub fn display_with_currency(&self) -> String {
        format!("{:.2} {CURRENCY_CODE}", self.0.round_dp(2))
    }
}

impl Serialize for Money {
    /// Serialized as a JSON number; the backend reads unit prices as numbers.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_f64() {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> de::Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                Ok(Money(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::try_from(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}
