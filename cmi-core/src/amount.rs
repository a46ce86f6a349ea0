//! Decimal-comma amounts as printed on settlement statements.
//!
//! Accepted grammar (whole string, no surrounding text):
//!
//! ```text
//! amount   := ["-"] integer ["," fraction]
//! integer  := digit{1,3} (sep digit{3})+   -- one separator kind per amount
//!           | digit+
//! sep      := " " | U+00A0 | U+202F | "."
//! fraction := digit{1,2}
//! ```
//!
//! `1 234,56`, `1.234,56`, `1234,5` and `12` parse. `1234.56`, `1,234.56`,
//! `1 23,00` and `12,345` do not: ambiguous input is rejected rather than guessed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<sign>-)?",
        r"(?P<int>[0-9]{1,3}(?:[ .\x{00A0}\x{202F}][0-9]{3})+|[0-9]+)",
        r"(?:,(?P<frac>[0-9]{1,2}))?$"
    ))
    .expect("amount grammar is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("'{0}' is not a decimal-comma amount")]
    Malformed(String),
    #[error("'{0}' mixes thousands separators")]
    MixedSeparators(String),
    #[error("'{0}' is out of range")]
    Overflow(String),
}

/// A monetary amount held as signed cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal-comma amount, failing closed on anything outside the grammar.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let caps = AMOUNT_RE
            .captures(s)
            .ok_or_else(|| AmountError::Malformed(s.to_string()))?;

        let int = &caps["int"];
        let mut separators = int.chars().filter(|c| !c.is_ascii_digit());
        if let Some(first) = separators.next() {
            if separators.any(|c| c != first) {
                return Err(AmountError::MixedSeparators(s.to_string()));
            }
        }

        let digits: String = int.chars().filter(|c| c.is_ascii_digit()).collect();
        let units: i64 = digits
            .parse()
            .map_err(|_| AmountError::Overflow(s.to_string()))?;

        let frac = match caps.name("frac").map(|m| m.as_str()) {
            None => 0,
            Some(f) if f.len() == 1 => f.parse::<i64>().unwrap_or(0) * 10,
            Some(f) => f.parse::<i64>().unwrap_or(0),
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| AmountError::Overflow(s.to_string()))?;

        Ok(if caps.name("sign").is_some() {
            Amount(-cents)
        } else {
            Amount(cents)
        })
    }

    /// Parse an optional cell: empty or whitespace-only means "no amount".
    pub fn parse_optional(input: &str) -> Result<Option<Self>, AmountError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        Self::parse(input).map(Some)
    }

    /// Decimal-comma rendering without grouping, e.g. `1234,56`.
    pub fn to_plain(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{},{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for Amount {
    /// Statement rendering with space grouping, e.g. `1 234,56`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }

        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{grouped},{:02}", abs % 100)
    }
}

impl std::str::FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grouped_with_space() {
        assert_eq!(Amount::parse("1 234,56").unwrap().cents(), 123_456);
        assert_eq!(Amount::parse("1 234,56").unwrap().as_f64(), 1234.56);
    }

    #[test]
    fn test_parse_other_separators() {
        assert_eq!(Amount::parse("1.234,56").unwrap().cents(), 123_456);
        assert_eq!(Amount::parse("1\u{00A0}234\u{00A0}567,8").unwrap().cents(), 123_456_780);
        assert_eq!(Amount::parse("12\u{202F}000,00").unwrap().cents(), 1_200_000);
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Amount::parse("1234,5").unwrap().cents(), 123_450);
        assert_eq!(Amount::parse("12").unwrap().cents(), 1_200);
        assert_eq!(Amount::parse("0,07").unwrap().cents(), 7);
        assert_eq!(Amount::parse("  45,10 ").unwrap().cents(), 4_510);
        assert_eq!(Amount::parse("-3,20").unwrap().cents(), -320);
    }

    #[test]
    fn test_rejects_ambiguous_input() {
        assert!(matches!(Amount::parse("1234.56"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1,234.56"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1 23,00"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("12,345"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("abc"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1 234.567,00"), Err(AmountError::MixedSeparators(_))));
        assert_eq!(Amount::parse("   "), Err(AmountError::Empty));
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(matches!(
            Amount::parse("99999999999999999999"),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(Amount::parse_optional("").unwrap(), None);
        assert_eq!(Amount::parse_optional(" ").unwrap(), None);
        assert_eq!(Amount::parse_optional("5,00").unwrap(), Some(Amount::from_cents(500)));
        assert!(Amount::parse_optional("5.00").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_cents(123_456).to_string(), "1 234,56");
        assert_eq!(Amount::from_cents(100_000_000).to_string(), "1 000 000,00");
        assert_eq!(Amount::from_cents(5).to_string(), "0,05");
        assert_eq!(Amount::from_cents(-98_765).to_string(), "-987,65");
        assert_eq!(Amount::from_cents(123_456).to_plain(), "1234,56");
    }

    #[test]
    fn test_display_reparses() {
        for cents in [0, 1, 99, 100_000, 123_456_789, -4_200] {
            let a = Amount::from_cents(cents);
            assert_eq!(Amount::parse(&a.to_string()).unwrap(), a);
        }
    }
}
