//! Expense record model.

use crate::category::Category;
use crate::currency::Currency;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an expense record.
///
/// Ids are opaque strings, generated on the client and immutable once
/// assigned. Generated ids combine a millisecond timestamp with a random
/// suffix so they are collision-free within a process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("exp_{millis}_{}", &suffix[..9]))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ExpenseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Synchronization status of a record.
///
/// Informational only: the merge algorithm resolves conflicts by
/// `updated_at` and never consults this field. It exists so callers can
/// surface sync state (e.g. a conflict badge) without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Not yet confirmed by the remote store.
    Pending,
    /// Confirmed by the remote store.
    Synced,
    /// Local and remote versions diverged.
    Conflict,
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus::Pending
    }
}

/// One expense record.
///
/// Identity (`id`) and `created_at` are immutable after construction;
/// `updated_at` is refreshed on every mutation and never moves backwards.
/// `date` is the economic event timestamp, distinct from the bookkeeping
/// timestamps.
///
/// The serialized field names are camelCase, matching the on-disk layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique record id.
    pub id: ExpenseId,
    /// Positive amount in `currency` units.
    pub amount: Decimal,
    /// Spending category.
    pub category: Category,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the expense happened.
    pub date: DateTime<Utc>,
    /// Currency of `amount`.
    pub currency: Currency,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
    /// Sync state, informational only.
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Expense {
    /// Creates a new record with a generated id.
    ///
    /// `date` defaults to now, `currency` to [`Currency::USD`] and
    /// `description` to none; use the `with_*` builders to override them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if `amount` is not strictly
    /// positive.
    pub fn new(amount: Decimal, category: Category) -> CoreResult<Self> {
        validate_amount(amount)?;
        let now = Utc::now();
        Ok(Self {
            id: ExpenseId::generate(),
            amount,
            category,
            description: None,
            date: now,
            currency: Currency::default(),
            created_at: now,
            updated_at: now,
            sync_status: SyncStatus::Pending,
        })
    }

    /// Sets the id, replacing the generated one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the event date.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Applies a patch, refreshing `updated_at`.
    ///
    /// `updated_at` is bumped to `max(now, updated_at)` so it never moves
    /// backwards even if the wall clock does.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if the patch carries a
    /// non-positive amount; the record is left unchanged in that case.
    pub fn apply(&mut self, patch: ExpensePatch) -> CoreResult<()> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        self.updated_at = Utc::now().max(self.updated_at);
        self.sync_status = SyncStatus::Pending;
        Ok(())
    }
}

fn validate_amount(amount: Decimal) -> CoreResult<()> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidAmount { amount });
    }
    Ok(())
}

/// A partial update for an expense record.
///
/// Unset fields leave the record untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    /// New amount, if changing.
    pub amount: Option<Decimal>,
    /// New category, if changing.
    pub category: Option<Category>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New event date, if changing.
    pub date: Option<DateTime<Utc>>,
    /// New currency, if changing.
    pub currency: Option<Currency>,
}

impl ExpensePatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the event date.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.currency.is_none()
    }
}
