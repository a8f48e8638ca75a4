use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A monetary value in reais, kept at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Rounds half away from zero to cents, as bank statements do.
    pub fn from_decimal(decimal: Decimal) -> Self {
        let mut value = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(2);
        Money(value)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Renders Brazilian notation: `R$ 1.234,56`, `-R$ 10,00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.0.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{sign}R$ {grouped},{frac_part}")
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn from_decimal_rounds_to_cents() {
        let m = Money::from_decimal(Decimal::from_str("10.005").unwrap());
        assert_eq!(m, Money::from_cents(1001));
        let m = Money::from_decimal(Decimal::from_str("10.015").unwrap());
        assert_eq!(m, Money::from_cents(1002));
        let m = Money::from_decimal(Decimal::from_str("-0.125").unwrap());
        assert_eq!(m, Money::from_cents(-13));
        let m = Money::from_decimal(Decimal::from_str("3.14159").unwrap());
        assert_eq!(m, Money::from_cents(314));
    }

    #[test]
    fn display_uses_brazilian_grouping() {
        assert_eq!(Money::from_cents(123456).to_string(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0,05");
        assert_eq!(Money::from_cents(100000000).to_string(), "R$ 1.000.000,00");
        assert_eq!(Money::from_cents(-1000).to_string(), "-R$ 10,00");
    }

    #[test]
    fn abs_and_negation() {
        let m = Money::from_cents(-250);
        assert!(m.is_negative());
        assert_eq!(m.abs(), Money::from_cents(250));
        assert_eq!(-m, Money::from_cents(250));
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [100, 250, -50].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total, Money::from_cents(300));
    }
}
