//! Fixed-point price representation.
//!
//! The shop trades in a single currency, so a `Price` is just an exact
//! decimal amount. Arithmetic goes through [`rust_decimal::Decimal`] rather
//! than binary floating point: order totals must equal the sum of their
//! line items forever, and `0.1 + 0.2` style drift would silently break
//! that invariant.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact monetary amount in the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from minor units (e.g. cents).
    ///
    /// `Price::from_minor_units(1050)` is 10.50.
    #[must_use]
    pub fn from_minor_units(units: i64) -> Self {
        Self(Decimal::new(units, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line subtotal: this unit price multiplied by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

// SQLx support (with postgres feature): stored as NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units() {
        let price = Price::from_minor_units(1050);
        assert_eq!(price.to_string(), "10.50");
    }

    #[test]
    fn test_times_is_exact() {
        let price = Price::from_minor_units(1999);
        assert_eq!(price.times(3), Price::from_minor_units(5997));
    }

    #[test]
    fn test_sum() {
        let total: Price = [
            Price::from_minor_units(1000).times(2),
            Price::from_minor_units(550),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Price::from_minor_units(2550));
    }

    #[test]
    fn test_no_binary_float_drift() {
        // 0.1 + 0.2 == 0.3 exactly, unlike f64.
        let total = Price::from_minor_units(10) + Price::from_minor_units(20);
        assert_eq!(total, Price::from_minor_units(30));
    }

    #[test]
    fn test_display_pads_to_two_decimals() {
        assert_eq!(Price::from_minor_units(500).to_string(), "5.00");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = Price::from_minor_units(2550);
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
