//! Fixed-point money amount.

use core::str::FromStr;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const CENTS_PER_UNIT: i64 = 100;
const CENTS_SCALE: u32 = 2;

/// Signed amount in the smallest currency unit (cents).
///
/// Integer cents keep balances exact: repeated deposits and withdrawals never
/// drift, and a zero balance compares equal to zero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units (e.g. `Money::from_units(100)` is `100.00`).
    pub fn from_units(units: i64) -> DomainResult<Self> {
        units
            .checked_mul(CENTS_PER_UNIT)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("amount out of range"))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }

    pub fn checked_sub(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&Decimal::new(self.0, CENTS_SCALE), f)
    }
}

/// Accepts `"100"`, `"100.5"`, `"100.50"`, `"100,50"` and a leading sign.
///
/// Zero and negative amounts parse fine; rejecting them is the ledger's job.
impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let decimal = Decimal::from_str(&s.replace(',', "."))
            .map_err(|_| DomainError::validation(format!("invalid amount: {s:?}")))?;

        if decimal.scale() > CENTS_SCALE {
            return Err(DomainError::validation(format!(
                "invalid amount (at most two decimal places): {s:?}"
            )));
        }

        decimal
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| DomainError::validation(format!("amount out of range: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(parse("100"), Money::from_cents(10_000));
        assert_eq!(parse("100.5"), Money::from_cents(10_050));
        assert_eq!(parse("100.05"), Money::from_cents(10_005));
        assert_eq!(parse("0,99"), Money::from_cents(99));
        assert_eq!(parse("  42.10\n"), Money::from_cents(4_210));
    }

    #[test]
    fn parses_zero_and_negative_amounts() {
        assert_eq!(parse("0"), Money::ZERO);
        assert_eq!(parse("-3.25"), Money::from_cents(-325));
        assert_eq!(parse("+7"), Money::from_cents(700));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for input in [
            "",
            "abc",
            "1.234",
            "1.2.3",
            "1,2,3",
            "1e3",
            "12a",
            "99999999999999999999",
            "92233720368547758.08",
        ] {
            match input.parse::<Money>() {
                Err(DomainError::Validation(_)) => {}
                other => panic!("expected validation error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_cents(10_000).to_string(), "100.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-525).to_string(), "-5.25");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_cents(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn range_edges_parse_back() {
        for money in [Money::from_cents(i64::MIN), Money::from_cents(i64::MAX)] {
            assert_eq!(parse(&money.to_string()), money);
        }
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let err = Money::from_cents(i64::MAX)
            .checked_add(Money::from_cents(1))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(Money::from_units(i64::MAX).is_err());
        assert_eq!(Money::from_units(3).unwrap(), Money::from_cents(300));
    }

    #[test]
    fn serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(1_234)).unwrap();
        assert_eq!(json, "1234");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(1_234));
    }

    proptest! {
        /// Property: the displayed form of any amount parses back to the same amount.
        #[test]
        fn display_is_parseable(cents in any::<i64>()) {
            let money = Money::from_cents(cents);
            prop_assert_eq!(money.to_string().parse::<Money>().unwrap(), money);
        }

        #[test]
        fn add_then_sub_is_identity(a in -1_000_000_000i64..1_000_000_000i64, b in -1_000_000_000i64..1_000_000_000i64) {
            let a = Money::from_cents(a);
            let b = Money::from_cents(b);
            prop_assert_eq!(a.checked_add(b).unwrap().checked_sub(b).unwrap(), a);
        }
    }
}
