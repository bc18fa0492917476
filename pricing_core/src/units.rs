//! # Unit Types
//!
//! Type-safe wrappers for currency and rates. Pricing must never drift by a
//! cent because of binary floating point, so money is a fixed-point integer
//! and every rate is an integer count of basis points.
//!
//! ## Resolution
//!
//! - [`Money`] stores 10⁻¹⁰ dollar units in an `i64`. A whole-cent amount
//!   multiplied by two chained basis-point rates (e.g. a dutiable fraction
//!   then a duty rate) is still exact at that resolution.
//! - [`Bps`] stores basis points: `Bps(700)` is 7 %, `Bps(10_000)` is 100 %.
//!
//! Rounding to whole dollars happens only when a line item's low/high band
//! is produced, never on the way there.
//!
//! Pricing arithmetic goes through the `checked_*` methods, which return
//! `None` instead of wrapping once an amount leaves the `i64` range
//! (about $922M).
//!
//! ## Example
//!
//! ```rust
//! use pricing_core::units::{Bps, Money};
//!
//! let rate: Money = "160".parse().unwrap();
//! let base = rate.checked_mul(600).unwrap();
//! assert_eq!(base, Money::from_dollars(96_000));
//!
//! let duty = base.apply_bps(Bps(700)).unwrap();
//! assert_eq!(duty, Money::from_dollars(6_720));
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EstimateError;

// ============================================================================
// Rates
// ============================================================================

/// A rate in basis points (1 bps = 0.01 %)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bps(pub u32);

impl Bps {
    /// 100 %
    pub const WHOLE: Bps = Bps(10_000);

    /// Build from a whole percentage (`Bps::from_percent(30)` is 30 %)
    pub const fn from_percent(percent: u32) -> Self {
        Bps(percent * 100)
    }

    /// Lossy conversion for display only
    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// ============================================================================
// Money
// ============================================================================

/// Exact fixed-point currency amount.
///
/// Serializes as a dollar number for readability. Deserializes from an
/// integer, a float, or a decimal string; strings are parsed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Internal units per dollar
    pub const UNITS_PER_DOLLAR: i64 = 10_000_000_000;

    const UNITS_PER_CENT: i64 = Self::UNITS_PER_DOLLAR / 100;
    const DECIMALS: usize = 10;

    pub const ZERO: Money = Money(0);

    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * Self::UNITS_PER_DOLLAR)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents * Self::UNITS_PER_CENT)
    }

    /// Raw 10⁻¹⁰ dollar units
    pub const fn units(&self) -> i64 {
        self.0
    }

    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply by a basis-point rate. Exact whenever the product is
    /// representable at 10⁻¹⁰ dollars; otherwise rounded half-to-even at
    /// that resolution. `None` if the result is out of range.
    pub fn apply_bps(self, rate: Bps) -> Option<Money> {
        let scaled = self.0 as i128 * rate.0 as i128;
        i64::try_from(div_round_half_even(scaled, Bps::WHOLE.0 as i128))
            .ok()
            .map(Money)
    }

    /// Rate × quantity, e.g. $/sqft × area or $/module × modules
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(quantity as i64).map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Round to whole dollars, half-to-even
    pub fn round_dollars(self) -> i64 {
        div_round_half_even(self.0 as i128, Self::UNITS_PER_DOLLAR as i128) as i64
    }

    /// Lossy conversion for serialization and display
    pub fn to_dollars_f64(self) -> f64 {
        self.0 as f64 / Self::UNITS_PER_DOLLAR as f64
    }

    /// Nearest representable amount to a float dollar value, or `None` for
    /// non-finite or out-of-range input
    pub fn from_dollars_f64(dollars: f64) -> Option<Self> {
        let units = (dollars * Self::UNITS_PER_DOLLAR as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if units.is_finite() && units >= i64::MIN as f64 && units < i64::MAX as f64 {
            Some(Money(units as i64))
        } else {
            None
        }
    }

    /// Exact decimal rendering with trailing zeros trimmed (minimum two
    /// decimals), e.g. `96000.00` or `6.7200000001`
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::UNITS_PER_DOLLAR as u64;
        let frac = abs % Self::UNITS_PER_DOLLAR as u64;
        let mut digits = format!("{:0width$}", frac, width = Self::DECIMALS);
        while digits.len() > 2 && digits.ends_with('0') {
            digits.pop();
        }
        format!("{}{}.{}", sign, whole, digits)
    }
}

/// Integer division rounding half-to-even. `divisor` must be positive.
pub(crate) fn div_round_half_even(value: i128, divisor: i128) -> i128 {
    let quotient = value.div_euclid(divisor);
    let remainder = value.rem_euclid(divisor);
    match (remainder * 2).cmp(&divisor) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl FromStr for Money {
    type Err = EstimateError;

    /// Parse a plain decimal dollar amount ("8000", "12.50", "-3.1").
    /// Underscores and commas are accepted as digit separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EstimateError::invalid_input("money", s, reason);

        let cleaned: String = s
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != '_' && *c != ',')
            .collect();
        let (negative, body) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("No digits"));
        }
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !digits(whole) || !digits(frac) {
            return Err(invalid("Not a decimal number"));
        }
        if frac.len() > Self::DECIMALS {
            return Err(invalid("More than 10 decimal places"));
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(Self::UNITS_PER_DOLLAR))
                .ok_or_else(|| invalid("Amount out of range"))?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = Self::DECIMALS);
            padded.parse::<i64>().map_err(|_| invalid("Not a decimal number"))?
        };

        let units = whole_units
            .checked_add(frac_units)
            .ok_or_else(|| invalid("Amount out of range"))?;
        Ok(Money(if negative { -units } else { units }))
    }
}

impl fmt::Display for Money {
    /// Dollars rounded to the cent with thousands separators, e.g. `$96,000.00`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = div_round_half_even(self.0 as i128, Self::UNITS_PER_CENT as i128) as i64;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, group_thousands(abs / 100), abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_dollars_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a dollar amount as a number or decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(Money::UNITS_PER_DOLLAR)
                    .map(Money)
                    .ok_or_else(|| E::custom("dollar amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom("dollar amount out of range"))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_dollars_f64(v)
                    .ok_or_else(|| E::custom("dollar amount must be finite and in range"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(|e: EstimateError| E::custom(e.to_string()))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Whole dollars with thousands separators, e.g. `$118,560`
pub fn format_dollars(dollars: i64) -> String {
    let sign = if dollars < 0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(dollars.unsigned_abs()))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_display() {
        assert_eq!(Bps(700).to_string(), "7%");
        assert_eq!(Bps(9_550).to_string(), "95.50%");
        assert_eq!(Bps::from_percent(30), Bps(3_000));
    }

    #[test]
    fn test_parse_money() {
        assert_eq!("8000".parse::<Money>().unwrap(), Money::from_dollars(8_000));
        assert_eq!("12.50".parse::<Money>().unwrap(), Money::from_cents(1_250));
        assert_eq!("$1,250.5".parse::<Money>().unwrap(), Money::from_cents(125_050));
        assert_eq!("-3.1".parse::<Money>().unwrap(), -Money::from_cents(310));
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_apply_bps_is_exact_for_chained_rates() {
        // 70 % of $20/sqft × 601 sqft, then 7 % duty: 601 × 20 × 0.7 × 0.07 = 588.98
        let premium = "20".parse::<Money>().unwrap().checked_mul(601).unwrap();
        let duty = premium.apply_bps(Bps(7_000)).unwrap().apply_bps(Bps(700)).unwrap();
        assert_eq!(duty, Money::from_cents(58_898));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        // $20M/sqft over 600 sqft is past the ~$922M ceiling
        let rate = Money::from_dollars(20_000_000);
        assert_eq!(rate.checked_mul(600), None);
        assert_eq!(rate.checked_mul(40), Some(Money::from_dollars(800_000_000)));

        let near_max = Money::from_units(i64::MAX - 1);
        assert_eq!(near_max.checked_add(Money::from_dollars(1)), None);
        assert_eq!(Money::from_units(i64::MIN).checked_sub(Money::from_units(1)), None);
        assert_eq!(near_max.apply_bps(Bps::from_percent(200)), None);
        assert_eq!(
            near_max.apply_bps(Bps::from_percent(50)),
            Some(Money::from_units(i64::MAX / 2))
        );
    }

    #[test]
    fn test_from_dollars_f64_rejects_out_of_range() {
        assert_eq!(Money::from_dollars_f64(12.5), Some(Money::from_cents(1_250)));
        assert_eq!(Money::from_dollars_f64(1e12), None);
        assert_eq!(Money::from_dollars_f64(-1e12), None);
        assert_eq!(Money::from_dollars_f64(f64::NAN), None);
        assert_eq!(Money::from_dollars_f64(f64::INFINITY), None);

        assert!(serde_json::from_str::<Money>("1e12").is_err());
        assert!(serde_json::from_str::<Money>("99999999999999").is_err());
    }

    #[test]
    fn test_round_dollars_half_even() {
        assert_eq!(Money::from_cents(250).round_dollars(), 2);
        assert_eq!(Money::from_cents(350).round_dollars(), 4);
        assert_eq!(Money::from_cents(351).round_dollars(), 4);
        assert_eq!(Money::from_cents(-250).round_dollars(), -2);
        assert_eq!(Money::from_cents(-251).round_dollars(), -3);
    }

    #[test]
    fn test_div_round_half_even() {
        assert_eq!(div_round_half_even(5, 2), 2);
        assert_eq!(div_round_half_even(7, 2), 4);
        assert_eq!(div_round_half_even(-5, 2), -2);
        assert_eq!(div_round_half_even(10, 3), 3);
        assert_eq!(div_round_half_even(11, 3), 4);
    }

    #[test]
    fn test_display_and_decimal_string() {
        assert_eq!(Money::from_dollars(96_000).to_string(), "$96,000.00");
        assert_eq!((-Money::from_cents(123_456)).to_string(), "-$1,234.56");
        assert_eq!(Money::from_dollars(96_000).to_decimal_string(), "96000.00");
        assert_eq!(Money::from_units(1).to_decimal_string(), "0.0000000001");
        assert_eq!(format_dollars(118_560), "$118,560");
        assert_eq!(format_dollars(999), "$999");
    }

    #[test]
    fn test_money_serde() {
        let json = serde_json::to_string(&Money::from_cents(1_250)).unwrap();
        assert_eq!(json, "12.5");
        let from_int: Money = serde_json::from_str("8000").unwrap();
        let from_float: Money = serde_json::from_str("12.5").unwrap();
        let from_str: Money = serde_json::from_str("\"0.07\"").unwrap();
        assert_eq!(from_int, Money::from_dollars(8_000));
        assert_eq!(from_float, Money::from_cents(1_250));
        assert_eq!(from_str, Money::from_cents(7));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_dollars(1), Money::from_cents(50)].iter().sum();
        assert_eq!(total, Money::from_cents(150));
    }
}
