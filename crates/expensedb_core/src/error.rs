//! Error types for ExpenseDB core.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ExpenseDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage adapter error.
    #[error("storage error: {0}")]
    Storage(#[from] expensedb_storage::StorageError),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Amount is zero, negative or not representable.
    #[error("invalid amount: {amount} (must be positive)")]
    InvalidAmount {
        /// The rejected amount.
        amount: Decimal,
    },

    /// Category name does not match any known category.
    #[error("unknown category: {name}")]
    UnknownCategory {
        /// The rejected category name.
        name: String,
    },

    /// Currency code does not match any known currency.
    #[error("unknown currency: {code}")]
    UnknownCurrency {
        /// The rejected currency code.
        code: String,
    },

    /// A record with this id already exists in the collection.
    #[error("duplicate record id: {id}")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },
}

impl CoreError {
    /// Creates an unknown category error.
    pub fn unknown_category(name: impl Into<String>) -> Self {
        Self::UnknownCategory { name: name.into() }
    }

    /// Creates an unknown currency error.
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        Self::UnknownCurrency { code: code.into() }
    }

    /// Creates a duplicate id error.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }
}
