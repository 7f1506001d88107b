//! Expense categories.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A spending category.
///
/// The set is closed: records always carry one of these values, and the
/// serialized form is the human-readable label (e.g. `"Food & Dining"`),
/// which is also the on-disk representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Restaurants, groceries and everything edible.
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    /// Fuel, transit fares, ride shares.
    #[serde(rename = "Transportation")]
    Transportation,
    /// General retail purchases.
    #[serde(rename = "Shopping")]
    Shopping,
    /// Movies, concerts, subscriptions.
    #[serde(rename = "Entertainment")]
    Entertainment,
    /// Recurring household bills.
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    /// Medical and pharmacy spending.
    #[serde(rename = "Healthcare")]
    Healthcare,
    /// Trips, flights, lodging.
    #[serde(rename = "Travel")]
    Travel,
    /// Tuition, courses, books.
    #[serde(rename = "Education")]
    Education,
    /// Personal care.
    #[serde(rename = "Personal")]
    Personal,
    /// Anything that fits nowhere else.
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 10] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::BillsAndUtilities,
        Category::Healthcare,
        Category::Travel,
        Category::Education,
        Category::Personal,
        Category::Other,
    ];

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Healthcare => "Healthcare",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Personal => "Personal",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.label() == s)
            .copied()
            .ok_or_else(|| CoreError::unknown_category(s))
    }
}
