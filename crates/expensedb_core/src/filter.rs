//! Query filters and aggregation results.

use crate::category::Category;
use crate::expense::Expense;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Criteria for selecting records from the collection.
///
/// All criteria are optional and combined with AND. Date bounds apply to the
/// event date and are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Exact category match.
    pub category: Option<Category>,
    /// Earliest event date to include.
    pub start_date: Option<DateTime<Utc>>,
    /// Latest event date to include.
    pub end_date: Option<DateTime<Utc>>,
}

impl ExpenseFilter {
    /// Creates a filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Restricts to events on or after `start`.
    #[must_use]
    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Restricts to events on or before `end`.
    #[must_use]
    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Returns true if the record satisfies every criterion.
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if expense.date > end {
                return false;
            }
        }
        true
    }
}

/// Combined query result: total, per-category totals and the matching
/// records, computed in a single pass.
///
/// Observationally identical to running the three queries independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseAnalysis {
    /// Sum of amounts over the matching records.
    pub total: Decimal,
    /// Per-category sums over the matching records.
    pub by_category: BTreeMap<Category, Decimal>,
    /// The matching records, sorted by event date descending.
    pub expenses: Vec<Expense>,
}
