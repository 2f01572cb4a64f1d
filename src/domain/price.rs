//! Price formatting
//!
//! Locale-aware rendering of listing prices. Pure functions, no state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Narrow no-break space, used by French grouping
const NARROW_NBSP: char = '\u{202f}';

/// No-break space between amount and currency
const NBSP: char = '\u{a0}';

/// Supported display locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLocale {
    /// `12 500,50 DA`
    Fr,
    /// `DA 12,500.50`
    En,
}

impl PriceLocale {
    fn group_separator(self) -> char {
        match self {
            PriceLocale::Fr => NARROW_NBSP,
            PriceLocale::En => ',',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            PriceLocale::Fr => ',',
            PriceLocale::En => '.',
        }
    }
}

impl FromStr for PriceLocale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" | "fr-dz" => Ok(PriceLocale::Fr),
            "en" | "en-us" | "en-gb" => Ok(PriceLocale::En),
            other => Err(DomainError::UnsupportedLocale(other.to_string())),
        }
    }
}

impl fmt::Display for PriceLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceLocale::Fr => write!(f, "fr"),
            PriceLocale::En => write!(f, "en"),
        }
    }
}

/// Price rendering settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormat {
    pub locale: PriceLocale,
    pub currency: String,
}

impl PriceFormat {
    pub fn new(locale: PriceLocale, currency: impl Into<String>) -> Self {
        Self {
            locale,
            currency: currency.into(),
        }
    }

    /// Render a price.
    ///
    /// Rounded to 2 decimal places; the fraction is omitted when it is zero.
    pub fn format(&self, price: Decimal) -> String {
        let rounded = price.round_dp(2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let fixed = format!("{:.2}", rounded.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut number = group_digits(whole, self.locale.group_separator());
        if fraction != "00" {
            number.push(self.locale.decimal_separator());
            number.push_str(fraction);
        }

        match self.locale {
            PriceLocale::Fr => format!("{sign}{number}{NBSP}{}", self.currency),
            PriceLocale::En => format!("{}{NBSP}{sign}{number}", self.currency),
        }
    }
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self::new(PriceLocale::Fr, "DA")
    }
}

/// Insert a separator every three digits from the right
fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(digits.len() + len / 3 * separator.len_utf8());

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }

    grouped
}
