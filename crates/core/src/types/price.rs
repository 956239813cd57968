//! BRL prices using decimal arithmetic.
//!
//! All amounts are Brazilian reais. The display form follows the `pt-BR`
//! currency layout: `R$` prefix, `.` as the thousands separator and `,` as
//! the decimal separator (`R$ 1.234,56`).
//!
//! [`format_cents`] and [`parse_display`] are exact inverses for every
//! integer cent amount:
//!
//! ```rust
//! # use configurator_core::{Price, format_cents, parse_display};
//! assert_eq!(format_cents(15000), "R$ 150,00");
//! assert_eq!(parse_display("R$ 150,00").unwrap(), Price::from_cents(15000));
//! ```

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Currency prefix used in the display form.
const CURRENCY_PREFIX: &str = "R$";

/// Errors that can occur when parsing a displayed price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceParseError {
    /// Nothing left after removing the currency prefix.
    #[error("price cannot be empty")]
    Empty,
    /// The remaining text is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A price in reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an integer number of centavos.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount in reais.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to whole centavos.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn cents(&self) -> Option<i64> {
        (self.0.round_dp(2) * Decimal::ONE_HUNDRED).to_i64()
    }

    /// Whether the amount has no fraction of a centavo.
    #[must_use]
    pub fn is_whole_cents(&self) -> bool {
        self.0.normalize().scale() <= 2
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cents() {
            Some(cents) => f.write_str(&format_cents(cents)),
            None => write!(f, "{CURRENCY_PREFIX} {}", self.0.round_dp(2)),
        }
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

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_display(s)
    }
}

/// Format an amount of centavos in the `pt-BR` currency layout.
///
/// ```rust
/// # use configurator_core::format_cents;
/// assert_eq!(format_cents(0), "R$ 0,00");
/// assert_eq!(format_cents(123_456), "R$ 1.234,56");
/// assert_eq!(format_cents(-100), "-R$ 1,00");
/// ```
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = group_thousands(abs / 100);
    let centavos = abs % 100;
    format!("{sign}{CURRENCY_PREFIX} {reais},{centavos:02}")
}

/// Parse a displayed price back into an amount.
///
/// Accepts the output of [`format_cents`] as well as bare numbers typed by
/// hand (`"150"`, `"150,5"`). Group separators are dropped before parsing, so
/// `"1.500"` reads as fifteen hundred reais.
///
/// # Errors
///
/// Returns [`PriceParseError::Empty`] if only the prefix (or nothing) is
/// given, and [`PriceParseError::Invalid`] if the rest is not a number.
pub fn parse_display(input: &str) -> Result<Price, PriceParseError> {
    let trimmed = input.trim();
    let (negative, rest) = trimmed
        .strip_prefix('-')
        .map_or((false, trimmed), |rest| (true, rest.trim_start()));
    let body = rest.strip_prefix(CURRENCY_PREFIX).unwrap_or(rest).trim();

    if body.is_empty() {
        return Err(PriceParseError::Empty);
    }

    let normalized: String = body
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let amount =
        Decimal::from_str(&normalized).map_err(|_| PriceParseError::Invalid(input.to_owned()))?;

    Ok(Price(if negative { -amount } else { amount }))
}

/// Apply the price input mask to raw keystrokes.
///
/// Non-digits are discarded and the remaining digits are read as centavos, so
/// typing `15000` shows `R$ 150,00`. An input without digits shows zero.
#[must_use]
pub fn mask_typed_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let cents = digits.parse::<i64>().unwrap_or(if digits.is_empty() { 0 } else { i64::MAX });
    format_cents(cents)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
