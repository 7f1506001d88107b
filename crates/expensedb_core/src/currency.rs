//! Supported currencies.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ISO 4217 currency code from the supported set.
///
/// The set is closed; the serialized form is the three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar.
    USD,
    /// Euro.
    EUR,
    /// British Pound.
    GBP,
    /// Japanese Yen.
    JPY,
    /// Chinese Yuan.
    CNY,
    /// Indian Rupee.
    INR,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Currency; 6] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CNY,
        Currency::INR,
    ];

    /// Returns the three-letter currency code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
        }
    }

    /// Returns the currency symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{a3}",
            Currency::JPY => "\u{a5}",
            Currency::CNY => "\u{a5}",
            Currency::INR => "\u{20b9}",
        }
    }

    /// Returns the English display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Currency::USD => "US Dollar",
            Currency::EUR => "Euro",
            Currency::GBP => "British Pound",
            Currency::JPY => "Japanese Yen",
            Currency::CNY => "Chinese Yuan",
            Currency::INR => "Indian Rupee",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .iter()
            .find(|c| c.code() == s)
            .copied()
            .ok_or_else(|| CoreError::unknown_currency(s))
    }
}
